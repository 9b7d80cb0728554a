pub mod simaerep;
pub mod site_list;
