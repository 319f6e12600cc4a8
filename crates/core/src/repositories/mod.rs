//! Record stores.
//!
//! Pure data operations over the file-backed store. No API concerns such as
//! authentication or HTTP belong here; those live in `api-shared`, `api-rest`
//! and `pages`.

pub mod consultas;
pub mod receitas;
