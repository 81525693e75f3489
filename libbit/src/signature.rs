//! author/committer/tagger identities (the `name <email> epoch offset` line
//! used in commit and tag KVLM payloads)
//!
//! grounded on the teacher's `signature.rs`.

use crate::error::BitGenericError;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochTime(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// timezone offset in minutes east of UTC
pub struct TzOffset(pub i32);

impl FromStr for TzOffset {
    type Err = BitGenericError;

    /// format: `(+|-)HHMM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 5 {
            bail!("invalid timezone offset `{}`", s);
        }
        let sign = match &s[0..1] {
            "+" => 1,
            "-" => -1,
            _ => bail!("invalid timezone offset sign in `{}`", s),
        };
        let hours: i32 = s[1..3].parse()?;
        let minutes: i32 = s[3..5].parse()?;
        Ok(Self(sign * (hours * 60 + minutes)))
    }
}

impl Display for TzOffset {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.0 >= 0 { '+' } else { '-' };
        let offset = self.0.abs();
        write!(f, "{}{:02}{:02}", sign, offset / 60, offset % 60)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Time {
    pub epoch: EpochTime,
    pub offset: TzOffset,
}

impl Time {
    pub fn now() -> Self {
        let now = chrono::Local::now();
        let offset = TzOffset(now.offset().local_minus_utc() / 60);
        Self { epoch: EpochTime(now.timestamp()), offset }
    }
}

impl FromStr for Time {
    type Err = BitGenericError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_ascii_whitespace();
        let epoch = parts.next().ok_or_else(|| anyhow!("missing timestamp in `{}`", s))?.parse()?;
        let offset = parts.next().ok_or_else(|| anyhow!("missing timezone in `{}`", s))?.parse()?;
        Ok(Self { epoch: EpochTime(epoch), offset })
    }
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.epoch.0, self.offset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub time: Time,
}

impl FromStr for Signature {
    type Err = BitGenericError;

    /// `Scott Chacon <schacon@gmail.com> 1243040974 -0700`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let email_start = s.find('<').ok_or_else(|| anyhow!("missing `<` in signature `{}`", s))?;
        let email_end = s.find('>').ok_or_else(|| anyhow!("missing `>` in signature `{}`", s))?;
        let name = s[..email_start].trim_end().to_owned();
        let email = s[email_start + 1..email_end].to_owned();
        let time = s[email_end + 1..].trim_start().parse()?;
        Ok(Self { name, email, time })
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_signature() {
        let s = "Scott Chacon <schacon@gmail.com> 1243040974 -0700";
        let sig: Signature = s.parse().unwrap();
        assert_eq!(sig.name, "Scott Chacon");
        assert_eq!(sig.email, "schacon@gmail.com");
        assert_eq!(sig.time.epoch.0, 1243040974);
        assert_eq!(sig.time.offset.0, -7 * 60);
        assert_eq!(sig.to_string(), s);
    }

    #[test]
    fn rejects_missing_email() {
        assert!("Scott Chacon 1243040974 -0700".parse::<Signature>().is_err());
    }
}
