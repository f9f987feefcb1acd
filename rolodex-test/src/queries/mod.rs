pub mod all_people;
pub mod edit_person;
