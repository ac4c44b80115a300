use quarry_actions::{PathRemapper, Value};

/// Renders one value for the argument vector. Only output-tree paths are
/// subject to path mapping; source paths are stable, so everything else
/// takes the plain coercion.
pub(crate) fn expand_value(value: &Value, remapper: &dyn PathRemapper) -> String {
    match value {
        Value::File(file) if file.is_derived() => remapper.map(&file.exec_path()).into_string(),
        other => other.expand_to_command_line(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use quarry_actions::{ExecPath, FileValue, NoopRemapper};

    use super::*;

    #[derive(Debug)]
    struct OutFile(&'static str);

    impl FileValue for OutFile {
        fn exec_path(&self) -> ExecPath {
            ExecPath::from(self.0)
        }

        fn is_derived(&self) -> bool {
            true
        }
    }

    #[derive(Debug)]
    struct SrcFile(&'static str);

    impl FileValue for SrcFile {
        fn exec_path(&self) -> ExecPath {
            ExecPath::from(self.0)
        }

        fn is_source_artifact(&self) -> bool {
            true
        }
    }

    struct PrefixRemapper;

    impl PathRemapper for PrefixRemapper {
        fn map(&self, path: &ExecPath) -> ExecPath {
            ExecPath::from(format!("mapped/{}", path.as_str()))
        }
    }

    #[test]
    fn derived_files_are_remapped() {
        let value = Value::File(Arc::new(OutFile("out/cfg/lib.a")));
        assert_eq!(expand_value(&value, &PrefixRemapper), "mapped/out/cfg/lib.a");
        assert_eq!(expand_value(&value, &NoopRemapper), "out/cfg/lib.a");
    }

    #[test]
    fn source_files_and_strings_are_not_remapped() {
        let file = Value::File(Arc::new(SrcFile("pkg/main.c")));
        assert_eq!(expand_value(&file, &PrefixRemapper), "pkg/main.c");
        assert_eq!(expand_value(&Value::from("-O2"), &PrefixRemapper), "-O2");
        assert_eq!(expand_value(&Value::from(42), &PrefixRemapper), "42");
    }
}
