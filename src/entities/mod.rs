//! Database entities for the Solentine API.
//!
//! All tables use UUID primary keys and carry `created_at` / `updated_at`
//! timestamps. `user_sale` is a denormalized back-reference index from a user
//! to the sales they created; the sale row remains the source of truth.

pub mod brand;
pub mod client;
pub mod comercial;
pub mod sale;
pub mod user;
pub mod user_sale;
pub mod zone;

pub use brand::Entity as Brand;
pub use client::Entity as Client;
pub use comercial::Entity as Comercial;
pub use sale::Entity as Sale;
pub use user::Entity as User;
pub use user_sale::Entity as UserSale;
pub use zone::Entity as Zone;
