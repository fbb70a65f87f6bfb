use std::fmt;

#[derive(Clone, Copy, Debug)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub build_date: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: option_env!("MOVIE_JOURNAL_COMMIT").unwrap_or("unknown"),
            build_date: option_env!("MOVIE_JOURNAL_BUILD_DATE").unwrap_or("unknown"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "movie-journal {}", self.version)?;
        writeln!(f, "commit: {}", self.commit)?;
        write!(f, "built: {}", self.build_date)
    }
}
