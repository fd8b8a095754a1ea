//! `mvnr compare`: order two versions.

use crate::version::{Version, compare_semver};
use anyhow::{Result, bail};
use clap::Args;
use std::cmp::Ordering;

#[derive(Args, Debug)]
pub struct CompareCommand {
    /// First version
    left: String,

    /// Second version
    right: String,

    /// Use SemVer 1.x ordering instead of Maven ordering
    #[arg(long)]
    semver: bool,
}

impl CompareCommand {
    pub fn execute(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let ordering = if self.semver {
            match compare_semver(&self.left, &self.right) {
                Some(ordering) => ordering,
                None => {
                    bail!("'{}' and '{}' are not both SemVer 1.x versions", self.left, self.right)
                }
            }
        } else {
            Version::parse(&self.left)?.cmp(&Version::parse(&self.right)?)
        };
        let symbol = match ordering {
            Ordering::Less => "<",
            Ordering::Equal => "==",
            Ordering::Greater => ">",
        };
        Ok(format!("{} {symbol} {}", self.left, self.right))
    }
}
