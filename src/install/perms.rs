//! POSIX permission strings: symbolic (`u=rwx,g=rx,o=rx`) or octal (`755`)

use std::fmt;
use std::str::FromStr;

use crate::error::InstallerError;

/// Default mode for installed binaries
pub const DEFAULT_PERMS: &str = "u=rwx,g=rx,o=rx";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions(u32);

impl Permissions {
    pub fn mode(self) -> u32 {
        self.0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self(0o755)
    }
}

impl FromStr for Permissions {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InstallerError::InvalidPermissions {
            perms: s.to_string(),
        };
        let s = s.trim();
        if s.is_empty() {
            return Err(invalid());
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            let mode = u32::from_str_radix(s, 8).map_err(|_| invalid())?;
            if mode > 0o7777 {
                return Err(invalid());
            }
            return Ok(Self(mode));
        }

        let mut mode: u32 = 0;
        for clause in s.split(',') {
            let (who, what) = clause.split_once('=').ok_or_else(invalid)?;
            if who.is_empty() {
                return Err(invalid());
            }
            let mut bits: u32 = 0;
            for c in what.chars() {
                bits |= match c {
                    'r' => 0o4,
                    'w' => 0o2,
                    'x' => 0o1,
                    _ => return Err(invalid()),
                };
            }
            for c in who.chars() {
                let offsets: &[u32] = match c {
                    'u' => &[6],
                    'g' => &[3],
                    'o' => &[0],
                    'a' => &[6, 3, 0],
                    _ => return Err(invalid()),
                };
                for offset in offsets {
                    mode = (mode & !(0o7 << offset)) | (bits << offset);
                }
            }
        }
        Ok(Self(mode))
    }
}

impl fmt::Display for Permissions {
    /// Octal form accepted by `chmod`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.0)
    }
}
