mod account;
mod cpf;
mod money;
mod password;
mod statement;
mod transaction;

pub use account::*;
pub use cpf::*;
pub use money::*;
pub use password::*;
pub use statement::*;
pub use transaction::*;
