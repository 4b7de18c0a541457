//! Direct Connect gateway, association and proposal schemas

use dxform_core::schema::{AttributeSchema, AttributeType, ResourceSchema};

use super::{arn, computed_string, timeouts, types};

pub fn gateway() -> ResourceSchema {
    ResourceSchema::new("dx_gateway")
        .attribute(AttributeSchema::new("name", AttributeType::String).required())
        .attribute(
            AttributeSchema::new("amazon_side_asn", types::amazon_side_asn())
                .required()
                .force_new(),
        )
        .attribute(timeouts())
        .attribute(arn())
        .attribute(computed_string("owner_account_id"))
}

pub fn gateway_association() -> ResourceSchema {
    ResourceSchema::new("dx_gateway_association")
        .with_description(
            "Association of a Direct Connect gateway with a virtual private or transit gateway",
        )
        .attribute(
            AttributeSchema::new("dx_gateway_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("associated_gateway_id", AttributeType::String)
                .computed()
                .force_new()
                .conflicts_with(&["proposal_id"]),
        )
        .attribute(
            AttributeSchema::new("associated_gateway_owner_account_id", AttributeType::String)
                .computed()
                .force_new()
                .requires(&["proposal_id"]),
        )
        .attribute(
            AttributeSchema::new("proposal_id", AttributeType::String)
                .requires(&["associated_gateway_owner_account_id"])
                .with_description("Proposal to accept from another account"),
        )
        .attribute(AttributeSchema::new("allowed_prefixes", types::prefixes()).computed())
        .attribute(timeouts())
        .attribute(computed_string("associated_gateway_type"))
        .attribute(computed_string("dx_gateway_association_id"))
        .attribute(computed_string("dx_gateway_owner_account_id"))
}

pub fn gateway_association_proposal() -> ResourceSchema {
    ResourceSchema::new("dx_gateway_association_proposal")
        .attribute(
            AttributeSchema::new("dx_gateway_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("dx_gateway_owner_account_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("associated_gateway_id", AttributeType::String)
                .required()
                .force_new(),
        )
        .attribute(
            AttributeSchema::new("allowed_prefixes", types::prefixes())
                .computed()
                .force_new(),
        )
        .attribute(timeouts())
        .attribute(computed_string("associated_gateway_owner_account_id"))
        .attribute(computed_string("associated_gateway_type"))
}
