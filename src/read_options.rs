use {
    crate::exec::Utility,
    std::{
        path::PathBuf,
        str::FromStr,
    },
};

/// How the mount table is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Strategy {
    /// On linux, the per-process mount table exposed by the
    /// kernel in /proc is parsed
    Mountinfo,
    /// On mac, the output of the mount command is parsed
    MountCommand,
}

/// What to do with a record of the mount table which can't be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    /// the whole read fails
    Fail,
    /// the record is logged then ignored
    Skip,
}

impl Strategy {
    /// the strategy for the platform this crate was built for, if any
    pub fn host() -> Option<Self> {
        if cfg!(target_os = "linux") {
            Some(Self::Mountinfo)
        } else if cfg!(target_os = "macos") {
            Some(Self::MountCommand)
        } else {
            None
        }
    }
    /// Mountinfo lines follow a strict format, so a bad one means
    /// something is really wrong, while the mount command is meant
    /// for humans and may print lines we don't understand
    pub fn default_parse_policy(self) -> ParsePolicy {
        match self {
            Self::Mountinfo => ParsePolicy::Fail,
            Self::MountCommand => ParsePolicy::Skip,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    /// None means the host's strategy
    pub strategy: Option<Strategy>,
    /// None means the strategy's default policy
    pub parse_policy: Option<ParsePolicy>,
    pub mountinfo_path: PathBuf,
    pub lsblk: Utility,
    pub mount: Utility,
    pub umount: Utility,
    pub mkfs: Utility,
}
impl Default for Options {
    fn default() -> Self {
        Self {
            strategy: None,
            parse_policy: None,
            mountinfo_path: PathBuf::from("/proc/self/mountinfo"),
            lsblk: Utility::new("lsblk"),
            mount: Utility::new("mount"),
            umount: Utility::new("umount"),
            mkfs: Utility::new("mkfs"),
        }
    }
}
impl Options {
    pub fn strategy(
        mut self,
        v: Strategy,
    ) -> Self {
        self.strategy = Some(v);
        self
    }
    pub fn parse_policy(
        mut self,
        v: ParsePolicy,
    ) -> Self {
        self.parse_policy = Some(v);
        self
    }
    pub fn mountinfo_path<P: Into<PathBuf>>(
        mut self,
        v: P,
    ) -> Self {
        self.mountinfo_path = v.into();
        self
    }
    pub fn lsblk(
        mut self,
        v: Utility,
    ) -> Self {
        self.lsblk = v;
        self
    }
    pub fn mount(
        mut self,
        v: Utility,
    ) -> Self {
        self.mount = v;
        self
    }
    pub fn umount(
        mut self,
        v: Utility,
    ) -> Self {
        self.umount = v;
        self
    }
    pub fn mkfs(
        mut self,
        v: Utility,
    ) -> Self {
        self.mkfs = v;
        self
    }
    pub(crate) fn resolved_strategy(&self) -> Option<Strategy> {
        self.strategy.or_else(Strategy::host)
    }
    pub(crate) fn resolved_parse_policy(
        &self,
        strategy: Strategy,
    ) -> ParsePolicy {
        self.parse_policy
            .unwrap_or_else(|| strategy.default_parse_policy())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseStrategyError;
impl FromStr for Strategy {
    type Err = ParseStrategyError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mountinfo" => Ok(Self::Mountinfo),
            "mount" => Ok(Self::MountCommand),
            _ => Err(ParseStrategyError),
        }
    }
}
impl std::fmt::Display for ParseStrategyError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter,
    ) -> std::fmt::Result {
        write!(f, "expected \"mountinfo\" or \"mount\"")
    }
}
impl std::error::Error for ParseStrategyError {}

#[test]
fn test_strategy_from_str() {
    assert_eq!("mountinfo".parse(), Ok(Strategy::Mountinfo));
    assert_eq!("mount".parse(), Ok(Strategy::MountCommand));
    assert_eq!("diskutil".parse::<Strategy>(), Err(ParseStrategyError));
}

#[test]
fn test_parse_policy_defaults() {
    let options = Options::default();
    assert_eq!(
        options.resolved_parse_policy(Strategy::Mountinfo),
        ParsePolicy::Fail
    );
    assert_eq!(
        options.resolved_parse_policy(Strategy::MountCommand),
        ParsePolicy::Skip
    );
    let options = options.parse_policy(ParsePolicy::Skip);
    assert_eq!(
        options.resolved_parse_policy(Strategy::Mountinfo),
        ParsePolicy::Skip
    );
}
