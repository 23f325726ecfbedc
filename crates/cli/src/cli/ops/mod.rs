pub mod add;
pub mod clean;
pub mod del;
pub mod get;
pub mod init;
pub mod remove;
pub mod union;

pub use add::Add;
pub use clean::Clean;
pub use del::Del;
pub use get::Get;
pub use init::Init;
pub use remove::Remove;
pub use union::Union;

/// One value per line, like `ls`.
pub(crate) fn lines(values: Vec<String>) -> String {
    values.join("\n")
}
