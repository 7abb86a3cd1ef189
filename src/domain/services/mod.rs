pub mod comma_list;
pub mod search_trigger;
