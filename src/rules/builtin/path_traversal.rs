use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::CallTable;
use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const NODE_FS: &[&str] = &[
    "readFile",
    "readFileSync",
    "writeFile",
    "writeFileSync",
    "appendFile",
    "appendFileSync",
    "unlink",
    "unlinkSync",
    "readdir",
    "readdirSync",
    "createReadStream",
    "createWriteStream",
];

const GO_FS: &[&str] = &["os.Open", "os.Create", "os.OpenFile", "os.ReadFile", "os.WriteFile"];

static FS_TABLES: Lazy<HashMap<Language, CallTable>> = Lazy::new(|| {
    HashMap::from([
        (Language::JavaScript, CallTable::default().properties(NODE_FS, 0)),
        (Language::TypeScript, CallTable::default().properties(NODE_FS, 0)),
        (Language::Python, CallTable::default().callees(&["open"], 0)),
        (Language::Go, CallTable::default().callees(GO_FS, 0)),
    ])
});

/// Path Traversal
///
/// Flags file-system calls whose path argument is computed at runtime.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    let Some(table) = FS_TABLES.get(&language) else {
        return Vec::new();
    };

    parsed
        .calls
        .iter()
        .filter(|call| !call.construct)
        .filter(|call| {
            table
                .argument_index(call)
                .and_then(|i| call.arg(i))
                .is_some_and(|arg| arg.shape.is_dynamic())
        })
        .map(|call| call.site.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::{lines, run};

    #[cfg(feature = "javascript")]
    #[test]
    fn flags_dynamic_fs_paths() {
        let code = r#"fs.readFile(req.query.file, cb);
fs.readFileSync("/etc/hosts");
fs.createReadStream(path.join(root, name));
fs.writeFileSync(`${dir}/out.txt`, data);
fs.unlink('/tmp/x');
"#;
        assert_eq!(lines(&run(matches, "a.js", code)), vec![1, 3, 4]);
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn bare_fs_function_needs_member_access() {
        assert!(run(matches, "a.js", "readFile(name);").is_empty());
    }

    #[cfg(feature = "python")]
    #[test]
    fn flags_python_open() {
        let code = "open(user_path)\nopen('config.ini')\nopen(base + name, 'w')\n";
        assert_eq!(lines(&run(matches, "a.py", code)), vec![1, 3]);
    }

    #[cfg(feature = "go")]
    #[test]
    fn flags_go_os_calls() {
        let code = r#"package main

func read(name string) {
	os.Open(name)
	os.ReadFile("/etc/passwd")
	os.WriteFile(filepath.Join(dir, name), data, 0644)
}
"#;
        assert_eq!(lines(&run(matches, "main.go", code)), vec![4, 6]);
    }
}
