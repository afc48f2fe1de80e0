//! Static schema of an activity event
//!
//! The admin API documents only a handful of fields; everything else was
//! collected from observed payloads. Unknown fields are tolerated
//! (`additionalProperties: true`) and every property except `Id` and
//! `CreationTime` is nullable.

use super::types::{JsonSchema, JsonType, SchemaProperty};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Schema for the `ActivityEvents` stream, built once
pub static ACTIVITY_EVENT_SCHEMA: Lazy<JsonSchema> = Lazy::new(build_activity_event_schema);

/// Access the activity event schema
pub fn activity_event_schema() -> &'static JsonSchema {
    &ACTIVITY_EVENT_SCHEMA
}

fn string() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::String)
}

fn integer() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::Integer)
}

fn boolean() -> SchemaProperty {
    SchemaProperty::nullable(JsonType::Boolean)
}

fn date_time() -> SchemaProperty {
    string().with_format("date-time")
}

fn object<const N: usize>(fields: [(&str, SchemaProperty); N]) -> SchemaProperty {
    let properties: BTreeMap<_, _> = fields
        .into_iter()
        .map(|(name, property)| (name.to_string(), property))
        .collect();
    SchemaProperty::object(properties).into_nullable()
}

fn array_of(items: SchemaProperty) -> SchemaProperty {
    SchemaProperty::array(items).into_nullable()
}

fn role_assignments() -> SchemaProperty {
    array_of(object([
        ("RolePermissions", string()),
        ("UserObjectId", string()),
    ]))
}

#[allow(clippy::too_many_lines)]
fn build_activity_event_schema() -> JsonSchema {
    let mut schema = JsonSchema::new()
        .with_title("ActivityEvents")
        .with_description("Power BI tenant activity audit event");

    schema.add_property("Id", SchemaProperty::new(JsonType::String));
    schema.add_property(
        "CreationTime",
        SchemaProperty::new(JsonType::String).with_format("date-time"),
    );
    schema.add_required("Id");
    schema.add_required("CreationTime");

    let properties = [
        ("RecordType", integer()),
        ("Operation", string()),
        ("OrganizationId", string()),
        ("UserType", integer()),
        ("UserKey", string()),
        ("Workload", string()),
        ("UserId", string()),
        ("ClientIP", string()),
        ("UserAgent", string()),
        ("Activity", string()),
        ("ItemName", string()),
        ("CapacityId", string()),
        ("CapacityName", string()),
        ("WorkspaceId", string()),
        ("WorkSpaceName", string()),
        ("DatasetId", string()),
        ("DatasetName", string()),
        ("GatewayId", string()),
        ("DatasourceId", string()),
        ("ReportId", string()),
        ("ReportName", string()),
        ("ObjectId", string()),
        ("IsSuccess", boolean()),
        ("ReportType", string()),
        ("RequestId", string()),
        ("ActivityId", string()),
        ("AppName", string()),
        ("AppReportId", string()),
        ("DistributionMethod", string()),
        ("ConsumptionMethod", string()),
        ("DataflowId", string()),
        ("DataflowName", string()),
        ("DataflowType", string()),
        (
            "DataflowAccessTokenRequestParameters",
            object([
                ("tokenLifetimeInMinutes", integer()),
                ("permissions", integer()),
                ("entityName", string()),
                ("partitionUri", string()),
            ]),
        ),
        ("DataflowRefreshScheduleType", string()),
        ("DataflowAllowNativeQueries", boolean()),
        ("CustomVisualAccessTokenResourceId", string()),
        ("CustomVisualAccessTokenSiteUri", string()),
        (
            "ExportedArtifactInfo",
            object([
                ("ExportType", string()),
                ("ArtifactType", string()),
                ("ArtifactId", integer()),
            ]),
        ),
        ("DataConnectivityMode", string()),
        ("LastRefreshTime", string()),
        (
            "Schedules",
            object([
                ("RefreshFrequency", string()),
                ("TimeZone", string()),
                ("Days", array_of(string())),
                ("Time", array_of(string())),
            ]),
        ),
        ("ImportId", string()),
        ("ImportType", string()),
        ("ImportSource", string()),
        ("ImportDisplayName", string()),
        ("RefreshType", string()),
        ("DashboardId", string()),
        ("DashboardName", string()),
        (
            "Datasets",
            array_of(object([
                ("DatasetId", string()),
                ("DatasetName", string()),
            ])),
        ),
        ("ModelsSnapshots", array_of(integer())),
        (
            "OrgAppPermission",
            object([("recipients", string()), ("permissions", string())]),
        ),
        (
            "GenerateScreenshotInformation",
            object([
                ("ExportType", integer()),
                ("ScreenshotEngineType", integer()),
                ("ExportFormat", string()),
                ("ExportUrl", string()),
            ]),
        ),
        ("SharingAction", string()),
        (
            "SharingInformation",
            array_of(object([
                ("RecipientEmail", string()),
                ("ResharePermission", string()),
            ])),
        ),
        ("ArtifactId", string()),
        ("ArtifactName", string()),
        ("FolderObjectId", string()),
        ("FolderDisplayName", string()),
        ("FolderAccessRequests", role_assignments()),
        ("ExportEventStartDateTimeParameter", date_time()),
        ("ExportEventEndDateTimeParameter", date_time()),
        ("ExportEventActivityTypeParameter", string()),
        ("CapacityUsers", string()),
        ("CapacityState", string()),
        ("DatasetCertificationStage", string()),
        ("ReportCertificationStage", string()),
        ("DeploymentPipelineId", integer()),
        ("DeploymentPipelineObjectId", string()),
        ("DeploymentPipelineDisplayName", string()),
        ("DeploymentPipelineStageOrder", integer()),
        ("DeploymentPipelineAccesses", role_assignments()),
        ("TileText", string()),
        ("TableName", string()),
        ("TemplateAppObjectId", string()),
        ("TemplatePackageName", string()),
        ("TemplateAppVersion", string()),
        ("TemplateAppOwnerTenantObjectId", string()),
        ("TemplateAppFolderObjectId", string()),
        ("TemplateAppIsInstalledWithAutomation", boolean()),
        ("IsTemplateAppFromMarketplace", boolean()),
        ("IsUpdateAppActivity", boolean()),
        ("SwitchState", string()),
        (
            "SubscribeeInformation",
            array_of(object([
                ("RecipientEmail", string()),
                ("RecipientName", string()),
                ("ObjectId", string()),
            ])),
        ),
        (
            "SubscriptionSchedule",
            object([
                ("Type", string()),
                ("WeekDays", array_of(string())),
                ("StartDate", date_time()),
                ("EndDate", date_time()),
                ("TimeZone", string()),
                ("Time", array_of(string())),
            ]),
        ),
        (
            "UserInformation",
            object([
                ("UsersAdded", array_of(string())),
                ("UsersRemoved", array_of(string())),
            ]),
        ),
        (
            "AggregatedWorkspaceInformation",
            object([
                ("WorkspaceCount", integer()),
                ("WorkspacesByCapacitySku", string()),
                ("WorkspacesByType", string()),
            ]),
        ),
        ("GatewayType", string()),
        ("DatasourceType", string()),
        (
            "AuditedArtifactInformation",
            object([
                ("Id", string()),
                ("Name", string()),
                ("ArtifactObjectId", string()),
                ("AnnotatedItemType", string()),
            ]),
        ),
        ("GatewayClusterId", string()),
        (
            "GatewayClusters",
            array_of(object([
                ("id", string()),
                (
                    "permissions",
                    array_of(object([
                        ("id", string()),
                        ("principalType", string()),
                        ("role", string()),
                        ("allowedDataSources", array_of(string())),
                    ])),
                ),
                ("type", string()),
                ("memberGatewaysIds", array_of(string())),
            ])),
        ),
        ("GatewayMemberId", string()),
        ("IsTenantAdminApi", boolean()),
        (
            "UpdateFeaturedTables",
            array_of(object([("TableName", string()), ("State", string())])),
        ),
        ("TakingOverOwner", string()),
        (
            "PaginatedReportDataSources",
            array_of(object([
                ("connectionString", string()),
                ("credentialRetrievalType", string()),
                ("provider", string()),
                ("name", string()),
                ("dMMoniker", string()),
            ])),
        ),
    ];

    for (name, property) in properties {
        schema.add_property(name, property);
    }

    schema
}
