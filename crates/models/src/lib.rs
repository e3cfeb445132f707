pub mod errors;
pub mod db;
pub mod product;
pub mod inventory;

#[cfg(test)]
mod tests;
