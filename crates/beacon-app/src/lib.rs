// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dotpath;
pub mod dotted;
pub mod form;
pub mod ids;
pub mod list;
pub mod schema;
pub mod state;

pub use dotpath::*;
pub use dotted::*;
pub use form::*;
pub use ids::*;
pub use list::*;
pub use schema::*;
pub use state::*;
