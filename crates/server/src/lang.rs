use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages a project can target. Anything outside this set is rejected
/// at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Language {
    Python,
    Java,
    Javascript,
    Cpp,
    C,
    Go,
    Bash,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Java => "java",
            Language::Javascript => "javascript",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::Go => "go",
            Language::Bash => "bash",
        }
    }

    /// Starter snippet seeded into a freshly created project.
    pub fn starter_code(&self) -> &'static str {
        match self {
            Language::Python => "print(\"Hello World\")",
            Language::Java => {
                "public class Main { public static void main(String[] args) { System.out.println(\"Hello World\"); } }"
            }
            Language::Javascript => "console.log(\"Hello World\");",
            Language::Cpp => {
                "#include <iostream>\n\nint main() {\n    std::cout << \"Hello World\" << std::endl;\n    return 0;\n}"
            }
            Language::C => {
                "#include <stdio.h>\n\nint main() {\n    printf(\"Hello World\\n\");\n    return 0;\n}"
            }
            Language::Go => {
                "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello World\")\n}"
            }
            Language::Bash => "echo \"Hello World\"",
        }
    }
}

impl FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "python" => Ok(Language::Python),
            "java" => Ok(Language::Java),
            "javascript" => Ok(Language::Javascript),
            "cpp" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            "go" => Ok(Language::Go),
            "bash" => Ok(Language::Bash),
            other => Err(UnsupportedLanguage(other.to_string())),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct UnsupportedLanguage(pub String);

impl fmt::Display for UnsupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a supported language", self.0)
    }
}

/// File extension handed to the execution engine. Unknown languages get an
/// empty extension rather than an error; the engine decides what it accepts.
pub fn file_extension(language: &str) -> &'static str {
    match language.trim().to_lowercase().as_str() {
        "python" => "py",
        "java" => "java",
        "javascript" => "js",
        "cpp" => "cpp",
        "c" => "c",
        "go" => "go",
        "bash" => "sh",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_supported_language() {
        for name in ["python", "java", "javascript", "cpp", "c", "go", "bash"] {
            let lang: Language = name.parse().expect("supported language");
            assert_eq!(lang.as_str(), name);
        }
    }

    #[test]
    fn parse_trims_and_lowercases() {
        let lang: Language = "  Python ".parse().expect("normalized input");
        assert_eq!(lang, Language::Python);
    }

    #[test]
    fn rejects_unknown_language() {
        let err = "rust".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "'rust' is not a supported language");
    }

    #[test]
    fn every_language_has_starter_code() {
        for name in ["python", "java", "javascript", "cpp", "c", "go", "bash"] {
            let lang: Language = name.parse().expect("supported language");
            assert!(!lang.starter_code().is_empty());
        }
        assert_eq!(Language::Python.starter_code(), "print(\"Hello World\")");
    }

    #[test]
    fn extension_lookup_defaults_to_empty() {
        assert_eq!(file_extension("python"), "py");
        assert_eq!(file_extension("bash"), "sh");
        assert_eq!(file_extension("JavaScript"), "js");
        assert_eq!(file_extension("cobol"), "");
    }
}
