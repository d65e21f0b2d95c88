//! Hidden `version` command: build details plus what this host resolves to

use crate::cli::args::DEFAULT_PATH_BINARIES;
use crate::error::Result;
use crate::github::DEFAULT_API_BASE;
use crate::platform::Platform;
use crate::tools::TOOLS;

pub fn run() -> Result<()> {
    print!("{}", report(Platform::detect()));
    Ok(())
}

/// The version text; a failed detection is shown rather than returned
fn report(host: Result<Platform>) -> String {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    let host = match host {
        Ok(platform) => platform.to_string(),
        Err(e) => format!("undetected ({e})"),
    };
    format!(
        "installer {} ({profile}, rust {})\n\
         host:          {host}\n\
         tools:         {}\n\
         binaries dir:  {DEFAULT_PATH_BINARIES}\n\
         github api:    {DEFAULT_API_BASE}\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_RUST_VERSION"),
        TOOLS.len(),
    )
}
