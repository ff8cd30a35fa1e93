mod config_loading;
mod file_wallet_round;
mod wire_framing;
