pub mod openai_embeddings_service;
pub mod vector_index_pinecone_repository;
