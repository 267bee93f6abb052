// src/resolve/mod.rs
pub mod columns;
pub mod roles;

pub use columns::{
    find_col_idx, find_exact_col_idx, ColumnMatch, DeskPhoneColumns, Field, LinesColumns,
    RooftopInfoColumns,
};
pub use roles::{classify, resolve_roles, FileRoles, Role, RoleFile};
