pub mod query;
pub mod supabase;

pub use query::{Order, TableQuery};
pub use supabase::SupabaseClient;
