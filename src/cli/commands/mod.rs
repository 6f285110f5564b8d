//! One module per subcommand, each exposing `execute`.

pub mod cipher;
pub mod import_cmd;
pub mod init;
pub mod list;
pub mod show;
