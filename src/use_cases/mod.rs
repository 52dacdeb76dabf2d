pub mod reconciler;
pub mod tailer;
pub mod watch;

#[cfg(test)]
pub(crate) mod test_support;
