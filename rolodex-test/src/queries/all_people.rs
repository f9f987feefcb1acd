pub struct AllPeople;
pub mod all_people {
    #![allow(dead_code)]
    pub const OPERATION_NAME: &'static str = "AllPeople";
    pub const QUERY: &'static str = include_str!("all_people.graphql");
    use serde::{Deserialize, Serialize};
    #[allow(dead_code)]
    type ID = String;
    #[derive(Deserialize, Clone, Debug, PartialEq)]
    #[doc = "A person in the directory"]
    pub struct AllPeoplePeople {
        pub id: ID,
        pub name: String
    }
    #[derive(Serialize, Clone)]
    pub struct Variables;
    #[derive(Deserialize, Clone, Debug)]
    pub struct ResponseData {
        #[doc = "Every person in the directory, in directory order"]
        pub people: Vec<AllPeoplePeople>
    }
}
impl rolodex::GraphQLQuery for AllPeople {
    type Variables = all_people::Variables;
    type ResponseData = all_people::ResponseData;
    fn build_query(variables: Self::Variables) -> ::rolodex::QueryBody<Self::Variables> {
        rolodex::QueryBody {
            variables,
            query: all_people::QUERY,
            operation_name: all_people::OPERATION_NAME
        }
    }
}
