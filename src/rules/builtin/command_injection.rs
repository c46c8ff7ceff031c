use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::CallTable;
use crate::ir::{Language, MatchSite};
use crate::parser::ParsedFile;

const NODE_SPAWN: &[&str] = &[
    "exec",
    "execSync",
    "execFile",
    "execFileSync",
    "spawn",
    "spawnSync",
];

const PYTHON_SPAWN: &[&str] = &[
    "os.system",
    "os.popen",
    "os.exec",
    "os.execv",
    "os.execve",
    "os.execvp",
    "subprocess.call",
    "subprocess.run",
    "subprocess.Popen",
    "subprocess.check_output",
    "subprocess.check_call",
    "commands.getoutput",
];

static SPAWN_TABLES: Lazy<HashMap<Language, CallTable>> = Lazy::new(|| {
    let node = || {
        CallTable::default()
            .callees(NODE_SPAWN, 0)
            .properties(NODE_SPAWN, 0)
    };
    HashMap::from([
        (Language::JavaScript, node()),
        (Language::TypeScript, node()),
        (Language::Python, CallTable::default().callees(PYTHON_SPAWN, 0)),
        (
            Language::Go,
            CallTable::default()
                .callees(&["exec.Command"], 0)
                .callees(&["exec.CommandContext"], 1),
        ),
    ])
});

/// Command Injection
///
/// Flags process-spawn calls whose command argument is present and is not a
/// plain string literal.
pub(super) fn matches(parsed: &ParsedFile, language: Language) -> Vec<MatchSite> {
    let Some(table) = SPAWN_TABLES.get(&language) else {
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
                .is_some_and(|arg| !arg.shape.is_string_literal())
        })
        .map(|call| call.site.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::builtin::test_support::{lines, run};

    #[cfg(feature = "python")]
    #[test]
    fn flags_variable_passes_literal() {
        let code = "import os\nos.system(cmd)\nos.system(\"ls\")\n";
        assert_eq!(lines(&run(matches, "run.py", code)), vec![2]);
    }

    #[cfg(feature = "python")]
    #[test]
    fn flags_fstring_command() {
        let code = "subprocess.run(f\"ls {path}\", shell=True)\nsubprocess.run(f\"ls\")\n";
        assert_eq!(lines(&run(matches, "run.py", code)), vec![1]);
    }

    #[cfg(feature = "python")]
    #[test]
    fn argument_list_counts_as_dynamic() {
        let code = "subprocess.check_output([\"git\", \"log\"])\n";
        assert_eq!(run(matches, "run.py", code).len(), 1);
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn flags_node_spawn_by_name_and_member() {
        let code = r#"
const { exec } = require('child_process');
exec(userCmd);
child_process.execSync(`git ${args}`);
cp.spawn('ls');
execFile("convert", [input]);
"#;
        assert_eq!(lines(&run(matches, "a.js", code)), vec![3, 4]);
    }

    #[cfg(feature = "javascript")]
    #[test]
    fn zero_argument_call_is_not_flagged() {
        assert!(run(matches, "a.js", "exec();\nregex.exec();").is_empty());
    }

    #[cfg(feature = "go")]
    #[test]
    fn go_checks_the_command_argument() {
        let code = r#"package main

func run(ctx context.Context, name string) {
	exec.Command(name)
	exec.Command("ls", name)
	exec.CommandContext(ctx, "ls")
	exec.CommandContext(ctx, name)
}
"#;
        assert_eq!(lines(&run(matches, "main.go", code)), vec![4, 7]);
    }
}
