use {
    crate::{
        error::*,
        Context,
    },
    snafu::prelude::*,
    std::{
        process::Output,
        thread,
        time::Duration,
    },
};

/// how often a running utility is checked for completion or cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// An external program, with the arguments always passed before
/// the ones of the operation (eg `nsenter -t 1 -m` to run in the
/// mount namespace of the host)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utility {
    program: String,
    args: Vec<String>,
}

impl Utility {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
    pub fn arg<S: Into<String>>(
        mut self,
        arg: S,
    ) -> Self {
        self.args.push(arg.into());
        self
    }
    pub fn program(&self) -> &str {
        &self.program
    }
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the utility, waiting for its end unless the context is
    /// cancelled or times out, in which case the process is killed.
    ///
    /// A non zero exit isn't an error here.
    pub fn run(
        &self,
        ctx: &Context,
        args: &[String],
    ) -> Result<Output> {
        ctx.check()?;
        let exe = self.program.as_str();
        tracing::debug!(exe, args = ?args, "running utility");
        let handle = duct::cmd(exe, self.args.iter().chain(args))
            .stdin_null()
            .stdout_capture()
            .stderr_capture()
            .unchecked()
            .start()
            .with_context(|_| CantExecuteSnafu { exe })?;
        loop {
            if let Some(output) = handle
                .try_wait()
                .with_context(|_| CantExecuteSnafu { exe })?
            {
                return Ok(output.clone());
            }
            if let Err(e) = ctx.check() {
                tracing::debug!(exe, "killing utility: {e}");
                if let Err(kill_error) = handle.kill() {
                    tracing::warn!(exe, "failed to kill utility: {kill_error}");
                }
                return Err(e);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Run the utility and return its standard output, failing
    /// when it doesn't exit successfully
    pub fn output(
        &self,
        ctx: &Context,
        args: &[String],
    ) -> Result<String> {
        let output = self.run(ctx, args)?;
        if !output.status.success() {
            return Err(self.failure(args, &output));
        }
        String::from_utf8(output.stdout).map_err(|_| Error::UnexpectedFormat)
    }

    /// Run the utility for its effect only
    pub fn exec(
        &self,
        ctx: &Context,
        args: &[String],
    ) -> Result<()> {
        let output = self.run(ctx, args)?;
        if !output.status.success() {
            let e = self.failure(args, &output);
            tracing::error!(exe = %self.program, "{e}");
            return Err(e);
        }
        Ok(())
    }

    fn failure(
        &self,
        args: &[String],
        output: &Output,
    ) -> Error {
        let mut combined = String::from_utf8_lossy(&output.stdout).to_string();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Error::CommandFailed {
            exe: self.program.clone(),
            args: self
                .args
                .iter()
                .chain(args)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            status: output.status.to_string(),
            output: combined.trim_end().to_string(),
        }
    }
}

/// make owned arguments from string slices
pub(crate) fn args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}
