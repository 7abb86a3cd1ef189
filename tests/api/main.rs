mod health_check;
mod insert_vector;
mod pages;
