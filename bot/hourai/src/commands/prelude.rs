use super::CommandError;
use anyhow::Result;
use std::str::FromStr;

pub trait ArgumentsExt {
    fn parse_next<T: FromArgument>(&mut self) -> Result<T>;

    fn parse_next_opt<T: FromArgument>(&mut self) -> Option<T> {
        self.parse_next().ok()
    }
}

pub trait FromArgument: Sized {
    type Err: std::error::Error + Send + Sync + 'static;
    fn parse_as(arg: impl AsRef<str>) -> Result<Self, Self::Err>;
}

impl<I, S> ArgumentsExt for I
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    fn parse_next<T: FromArgument>(&mut self) -> Result<T> {
        if let Some(arg) = self.next() {
            T::parse_as(arg.as_ref())
                .map_err(|err| CommandError::InvalidArgument(format!("{}: {}", arg.as_ref(), err)).into())
        } else {
            anyhow::bail!(CommandError::MissingArgument)
        }
    }
}

impl<T: FromStr> FromArgument for T
where
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    type Err = <T as FromStr>::Err;
    fn parse_as(arg: impl AsRef<str>) -> Result<Self, Self::Err> {
        arg.as_ref().parse()
    }
}
