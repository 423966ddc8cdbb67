pub mod nodes_txt;
pub mod ply;
