pub mod auth;

pub use auth::{
    admin_auth_middleware, customer_auth_middleware, supplier_auth_middleware, AdminClaims,
    CustomerClaims, SupplierClaims,
};
