use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use openhouse_core::contract::KEY_ATTRIBUTE;

use super::document_store::Item;

pub type AttributeMap = HashMap<String, AttributeValue>;

pub fn item_to_attributes(item: Item) -> Result<AttributeMap, serde_dynamo::Error> {
    serde_dynamo::to_item(item)
}

pub fn attributes_to_item(attributes: &AttributeMap) -> Result<Item, serde_dynamo::Error> {
    serde_dynamo::from_item(attributes.clone())
}

pub fn key(uuid: &str) -> AttributeMap {
    HashMap::from([(
        KEY_ATTRIBUTE.to_string(),
        AttributeValue::S(uuid.to_string()),
    )])
}
