pub struct EditPerson;
pub mod edit_person {
    #![allow(dead_code)]
    pub const OPERATION_NAME: &'static str = "EditPerson";
    pub const QUERY: &'static str = include_str!("edit_person.graphql");
    use serde::{Deserialize, Serialize};
    #[allow(dead_code)]
    type ID = String;
    #[derive(Deserialize, Clone, Debug, PartialEq)]
    #[doc = "A person in the directory"]
    pub struct EditPersonEditPerson {
        pub id: ID,
        pub name: String
    }
    #[derive(Serialize, Clone, Debug)]
    pub struct Variables {
        pub id: Option<String>,
        pub name: Option<String>
    }
    #[derive(Deserialize, Clone, Debug)]
    pub struct ResponseData {
        #[doc = "Rename a person and return the updated record"]
        #[serde(rename = "editPerson")]
        pub edit_person: Option<EditPersonEditPerson>
    }
}
impl rolodex::GraphQLQuery for EditPerson {
    type Variables = edit_person::Variables;
    type ResponseData = edit_person::ResponseData;
    fn build_query(variables: Self::Variables) -> ::rolodex::QueryBody<Self::Variables> {
        rolodex::QueryBody {
            variables,
            query: edit_person::QUERY,
            operation_name: edit_person::OPERATION_NAME
        }
    }
}
