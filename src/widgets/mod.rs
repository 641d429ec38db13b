pub mod category_list;
pub mod controls;
pub mod debug;
pub mod matrix;
pub mod sidebar;
pub mod text_input;
pub mod topic_table;
