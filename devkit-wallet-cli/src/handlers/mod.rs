//! Handler functions bridging the CLI surface to the wallet managers.

pub mod wallet_commands;
