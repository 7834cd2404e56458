// Library root
// -----------
// Everything the `pngx` binary does lives here so it can be tested without
// a terminal or a server.
//
// Module responsibilities:
// - `account`: the `Account` value, host normalisation and alias rules.
// - `config`: the TOML-backed account store (`ConfigStore`).
// - `api`: HTTP calls to Paperless-ngx, including credential checks.
// - `document`: document models and the edit logic.
// - `cli` / `commands`: argument parsing and the handlers behind them.
// - `ui`: terminal rendering and prompts.
// - `error`: error types of the library.
pub mod account;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod document;
pub mod error;
pub mod ui;
