pub mod backup;
pub mod prepare;
pub mod restore;

use crate::error::{ChainError, XtravaultError};

/// Scripts branch on these, so each operational failure keeps its own
/// code. 2 is the catch-all for usage, config, and IO trouble, matching
/// what clap itself exits with on bad flags.
pub fn exit_code_for(err: &XtravaultError) -> i32 {
    match err {
        XtravaultError::Command(_) => 1,
        XtravaultError::AlreadyRunning(_) => 3,
        XtravaultError::Chain(ChainError::EmptyChain) => 10,
        XtravaultError::Chain(ChainError::BaseUnavailable(_)) => 11,
        XtravaultError::MissingArguments => 12,
        XtravaultError::Chain(ChainError::AlreadyFinalized(_)) => 13,
        _ => 2,
    }
}

pub fn exit_for_error(err: &XtravaultError) -> ! {
    println!("{}", err);
    std::process::exit(exit_code_for(err));
}
