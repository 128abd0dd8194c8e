/// Raw chunk listing command.
pub mod chunks;
/// Class definition inspection command.
pub mod classes;
/// Material JSON export command.
pub mod dump;
/// Material path lookup command.
pub mod find;
/// Resource path hashing command.
pub mod hash;
/// File-level information command.
pub mod info;

mod util;

#[cfg(test)]
mod test_support;
