use crate::ContextError;
use std::path::PathBuf;
use strata_project_view::ProjectView;

const CONTEXT_NAME: &str = "Installation context";

/// Environment variable consulted when the view does not pin a java binary.
/// This is the single ambient value the engine reads.
const JAVA_HOME_ENV: &str = "JAVA_HOME";

/// Path to the java binary used to run the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaPathSpec {
    pub value: PathBuf,
}

/// Address the server debugger attaches to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebuggerAddressSpec {
    pub host: String,
    pub port: u16,
}

impl DebuggerAddressSpec {
    /// The value passed to the JVM's JDWP agent.
    pub fn to_jdwp_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Toolchain paths and debug settings chosen at install time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationContext {
    pub java_path: JavaPathSpec,
    pub debugger_address: Option<DebuggerAddressSpec>,
    pub project_view_file_path: Option<PathBuf>,
}

impl InstallationContext {
    pub fn builder() -> InstallationContextBuilder {
        InstallationContextBuilder::default()
    }
}

#[derive(Debug, Default)]
pub struct InstallationContextBuilder {
    java_path: Option<JavaPathSpec>,
    debugger_address: Option<DebuggerAddressSpec>,
    project_view_file_path: Option<PathBuf>,
}

impl InstallationContextBuilder {
    pub fn java_path(mut self, java_path: JavaPathSpec) -> Self {
        self.java_path = Some(java_path);
        self
    }

    pub fn debugger_address(mut self, debugger_address: Option<DebuggerAddressSpec>) -> Self {
        self.debugger_address = debugger_address;
        self
    }

    pub fn project_view_file_path(mut self, path: Option<PathBuf>) -> Self {
        self.project_view_file_path = path;
        self
    }

    pub fn build(self) -> Result<InstallationContext, ContextError> {
        let Some(java_path) = self.java_path else {
            return Err(ContextError::missing_field(CONTEXT_NAME, "java_path"));
        };
        Ok(InstallationContext {
            java_path,
            debugger_address: self.debugger_address,
            project_view_file_path: self.project_view_file_path,
        })
    }
}

/// Builds an [`InstallationContext`] from a project view.
#[derive(Debug, Default)]
pub struct InstallationContextConstructor {
    project_view_file_path: Option<PathBuf>,
}

impl InstallationContextConstructor {
    pub fn new(project_view_file_path: Option<PathBuf>) -> Self {
        InstallationContextConstructor {
            project_view_file_path,
        }
    }

    pub fn construct(&self, view: &ProjectView) -> Result<InstallationContext, ContextError> {
        tracing::debug!("constructing installation context");

        InstallationContext::builder()
            .java_path(map_java_path(view)?)
            .debugger_address(map_debugger_address(view))
            .project_view_file_path(self.project_view_file_path.clone())
            .build()
    }
}

/// Falls back to `$JAVA_HOME/bin/java` when the view omits `java_path`.
fn map_java_path(view: &ProjectView) -> Result<JavaPathSpec, ContextError> {
    if let Some(section) = &view.java_path {
        return Ok(JavaPathSpec {
            value: section.value.clone(),
        });
    }

    std::env::var_os(JAVA_HOME_ENV)
        .map(|java_home| JavaPathSpec {
            value: PathBuf::from(java_home).join("bin/java"),
        })
        .ok_or_else(|| {
            ContextError::mapping(
                "java_path",
                format!(
                    "'java_path' section is missing and the '{JAVA_HOME_ENV}' environment variable is not set."
                ),
            )
        })
}

fn map_debugger_address(view: &ProjectView) -> Option<DebuggerAddressSpec> {
    view.debugger_address
        .as_ref()
        .map(|section| DebuggerAddressSpec {
            host: section.host.clone(),
            port: section.port,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{env_lock, EnvVarGuard};
    use strata_project_view::ProjectViewParser;

    #[test]
    fn builder_without_java_path_fails_with_the_exact_message() {
        let err = InstallationContext::builder().build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Installation context creation failed! 'java_path' has to be defined."
        );
    }

    #[test]
    fn explicit_java_path_wins_over_the_environment() {
        let _lock = env_lock();
        let _guard = EnvVarGuard::set("JAVA_HOME", Some("/from/env"));

        let view = ProjectViewParser::new()
            .parse("targets: //a:a\njava_path: /from/view/java\n")
            .unwrap();
        let context = InstallationContextConstructor::default()
            .construct(&view)
            .unwrap();

        assert_eq!(context.java_path.value, PathBuf::from("/from/view/java"));
    }

    #[test]
    fn java_path_falls_back_to_java_home_with_the_binary_appended() {
        let _lock = env_lock();
        let _guard = EnvVarGuard::set("JAVA_HOME", Some("/opt/jdk-17"));

        let view = ProjectViewParser::new().parse("targets: //a:a\n").unwrap();
        let context = InstallationContextConstructor::default()
            .construct(&view)
            .unwrap();

        assert_eq!(context.java_path.value, PathBuf::from("/opt/jdk-17/bin/java"));
    }

    #[test]
    fn missing_java_path_and_environment_is_a_named_failure() {
        let _lock = env_lock();
        let _guard = EnvVarGuard::set("JAVA_HOME", None);

        let view = ProjectViewParser::new().parse("targets: //a:a\n").unwrap();
        let err = InstallationContextConstructor::default()
            .construct(&view)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "mapping project view into 'java_path' failed! 'java_path' section is missing \
             and the 'JAVA_HOME' environment variable is not set."
        );
    }

    #[test]
    fn debugger_address_is_optional() {
        let _lock = env_lock();
        let _guard = EnvVarGuard::set("JAVA_HOME", Some("/opt/jdk"));

        let parser = ProjectViewParser::new();
        let constructor = InstallationContextConstructor::default();

        let without = parser.parse("targets: //a:a\n").unwrap();
        assert!(constructor.construct(&without).unwrap().debugger_address.is_none());

        let with = parser
            .parse("targets: //a:a\ndebugger_address: localhost:8000\n")
            .unwrap();
        let address = constructor.construct(&with).unwrap().debugger_address.unwrap();
        assert_eq!(address.to_jdwp_address(), "localhost:8000");
    }

    #[test]
    fn carries_the_project_view_file_path() {
        let _lock = env_lock();
        let _guard = EnvVarGuard::set("JAVA_HOME", Some("/opt/jdk"));

        let view = ProjectViewParser::new().parse("targets: //a:a\n").unwrap();
        let context = InstallationContextConstructor::new(Some(PathBuf::from(
            "/work/ide.projectview",
        )))
        .construct(&view)
        .unwrap();

        assert_eq!(
            context.project_view_file_path,
            Some(PathBuf::from("/work/ide.projectview"))
        );
    }
}
