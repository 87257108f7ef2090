/// One bazel invocation: subcommand, command-specific flags, and arguments.
///
/// The runner completes the argv with the configured binary and the
/// workspace context's build flags; see [`crate::BazelRunner::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BazelCommand {
    subcommand: String,
    flags: Vec<String>,
    arguments: Vec<String>,
    /// Build flags from the workspace context apply to commands that evaluate
    /// the build graph; `bazel info` runs without them.
    use_build_flags: bool,
}

impl BazelCommand {
    pub fn new(subcommand: impl Into<String>) -> Self {
        BazelCommand {
            subcommand: subcommand.into(),
            flags: Vec::new(),
            arguments: Vec::new(),
            use_build_flags: true,
        }
    }

    pub fn info() -> Self {
        let mut command = BazelCommand::new("info");
        command.use_build_flags = false;
        command
    }

    pub fn query() -> Self {
        BazelCommand::new("query")
    }

    pub fn aquery() -> Self {
        BazelCommand::new("aquery")
    }

    pub fn build() -> Self {
        BazelCommand::new("build")
    }

    pub fn flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }

    pub fn flags(mut self, flags: impl IntoIterator<Item = String>) -> Self {
        self.flags.extend(flags);
        self
    }

    pub fn argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    pub fn arguments(mut self, arguments: impl IntoIterator<Item = String>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    /// Assemble the argv after the binary: subcommand, then the context's
    /// build flags, then command flags, then arguments.
    pub(crate) fn to_args(&self, build_flags: &[String]) -> Vec<String> {
        let mut args = Vec::with_capacity(
            1 + build_flags.len() + self.flags.len() + self.arguments.len(),
        );
        args.push(self.subcommand.clone());
        if self.use_build_flags {
            args.extend(build_flags.iter().cloned());
        }
        args.extend(self.flags.iter().cloned());
        args.extend(self.arguments.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_flags_come_before_command_flags_and_arguments() {
        let command = BazelCommand::aquery()
            .flag("--output=jsonproto")
            .argument("deps(//a:a)");

        let args = command.to_args(&["--config=ide".to_string()]);
        assert_eq!(
            args,
            vec!["aquery", "--config=ide", "--output=jsonproto", "deps(//a:a)"]
        );
    }

    #[test]
    fn info_skips_build_flags() {
        let args = BazelCommand::info().to_args(&["--config=ide".to_string()]);
        assert_eq!(args, vec!["info"]);
    }
}
