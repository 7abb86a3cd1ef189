pub mod embeddings_service;
pub mod vector_index_repository;
