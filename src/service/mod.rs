//! CrudService: schema-introspecting CRUD built from resolver, builder and catalog.

mod catalog;
mod crud;
mod resolver;
pub use catalog::{Catalog, InsertOutcome, PgCatalog};
pub use crud::{Created, CreatedFrom, CrudService};
pub use resolver::{FieldResolver, ResolvedInsert};
