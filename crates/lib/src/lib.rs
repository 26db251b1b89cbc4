//! envbind-lib: environment variables as Lua globals
//!
//! This crate makes environment variables behave like ordinary script
//! variables while every access goes to an environment store:
//! - `EnvStore`: the store collaborator (process environment or in-memory)
//! - `BindingRegistry`: name-keyed namespace of store-backed accessor pairs
//! - `EnvGlobals`: the registry mirrored into a Lua `_G`
//! - `Session`: runtime + configuration, one binding per exposed name

pub mod bind;
pub mod config;
pub mod consts;
pub mod history;
pub mod lua;
pub mod paths;
pub mod session;
pub mod store;
pub mod util;
