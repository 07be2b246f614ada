//! Built-in operation catalog
//!
//! Each entry is pure data: a service, an operation name, the parameter table and
//! the pagination, impact and selection metadata. Adding an operation means adding
//! a table entry; the pipeline does the rest.
//!
//! Parameter names follow the `Prefix_Member` convention for nested objects, e.g.
//! `Artifacts_Location` feeds `artifacts.location`.

use crate::error::{CoreError, Result};
use crate::operation::{
    ConfirmImpact, FieldKind, FieldSpec, OperationSpec, PaginationSpec, ScalarType, ServiceSpec,
};

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

pub static CODEBUILD: ServiceSpec = ServiceSpec {
    id: "codebuild",
    title: "AWS CodeBuild",
    endpoint_prefix: "codebuild",
    signing_name: "codebuild",
    target_prefix: "CodeBuild_20161006",
};

pub static SECRETS_MANAGER: ServiceSpec = ServiceSpec {
    id: "secretsmanager",
    title: "AWS Secrets Manager",
    endpoint_prefix: "secretsmanager",
    signing_name: "secretsmanager",
    target_prefix: "secretsmanager",
};

pub static DYNAMODB: ServiceSpec = ServiceSpec {
    id: "dynamodb",
    title: "Amazon DynamoDB",
    endpoint_prefix: "dynamodb",
    signing_name: "dynamodb",
    target_prefix: "DynamoDB_20120810",
};

pub static LOGS: ServiceSpec = ServiceSpec {
    id: "logs",
    title: "Amazon CloudWatch Logs",
    endpoint_prefix: "logs",
    signing_name: "logs",
    target_prefix: "Logs_20140328",
};

pub static SSM: ServiceSpec = ServiceSpec {
    id: "ssm",
    title: "AWS Systems Manager",
    endpoint_prefix: "ssm",
    signing_name: "ssm",
    target_prefix: "AmazonSSM",
};

static SERVICES: [&ServiceSpec; 5] = [&CODEBUILD, &DYNAMODB, &LOGS, &SECRETS_MANAGER, &SSM];

// ---------------------------------------------------------------------------
// CodeBuild
// ---------------------------------------------------------------------------

const SORT_ORDER: &[&str] = &["ASCENDING", "DESCENDING"];

const CB_SOURCE_TYPES: &[&str] = &[
    "CODECOMMIT",
    "CODEPIPELINE",
    "GITHUB",
    "GITHUB_ENTERPRISE",
    "GITLAB",
    "BITBUCKET",
    "S3",
    "NO_SOURCE",
];

const CB_SOURCE: &[FieldSpec] = &[
    FieldSpec::one_of("Source_Type", "type", CB_SOURCE_TYPES).required(),
    FieldSpec::string("Source_Location", "location"),
    FieldSpec::string("Source_Buildspec", "buildspec"),
    FieldSpec::integer("Source_GitCloneDepth", "gitCloneDepth"),
    FieldSpec::boolean("Source_ReportBuildStatus", "reportBuildStatus"),
];

const CB_ARTIFACTS: &[FieldSpec] = &[
    FieldSpec::one_of("Artifacts_Type", "type", &["CODEPIPELINE", "S3", "NO_ARTIFACTS"])
        .required(),
    FieldSpec::string("Artifacts_Location", "location"),
    FieldSpec::string("Artifacts_Name", "name"),
    FieldSpec::string("Artifacts_Path", "path"),
    FieldSpec::one_of("Artifacts_NamespaceType", "namespaceType", &["NONE", "BUILD_ID"]),
    FieldSpec::one_of("Artifacts_Packaging", "packaging", &["NONE", "ZIP"]),
    FieldSpec::boolean("Artifacts_EncryptionDisabled", "encryptionDisabled"),
    FieldSpec::boolean("Artifacts_OverrideArtifactName", "overrideArtifactName"),
];

const CB_ENVIRONMENT: &[FieldSpec] = &[
    FieldSpec::one_of(
        "Environment_Type",
        "type",
        &[
            "LINUX_CONTAINER",
            "LINUX_GPU_CONTAINER",
            "ARM_CONTAINER",
            "WINDOWS_SERVER_2019_CONTAINER",
        ],
    )
    .required(),
    FieldSpec::string("Environment_Image", "image").required(),
    FieldSpec::one_of(
        "Environment_ComputeType",
        "computeType",
        &[
            "BUILD_GENERAL1_SMALL",
            "BUILD_GENERAL1_MEDIUM",
            "BUILD_GENERAL1_LARGE",
            "BUILD_GENERAL1_2XLARGE",
        ],
    )
    .required(),
    FieldSpec::boolean("Environment_PrivilegedMode", "privilegedMode"),
    FieldSpec::new(
        "Environment_EnvironmentVariable",
        "environmentVariables",
        FieldKind::ObjectList,
    )
    .describe("List of {name, value, type} objects"),
];

const CB_CLOUDWATCH_LOGS: &[FieldSpec] = &[
    FieldSpec::one_of(
        "LogsConfig_CloudWatchLogs_Status",
        "status",
        &["ENABLED", "DISABLED"],
    ),
    FieldSpec::string("LogsConfig_CloudWatchLogs_GroupName", "groupName"),
    FieldSpec::string("LogsConfig_CloudWatchLogs_StreamName", "streamName"),
];

const CB_LOGS_CONFIG: &[FieldSpec] = &[FieldSpec::nested(
    "LogsConfig_CloudWatchLogs",
    "cloudWatchLogs",
    CB_CLOUDWATCH_LOGS,
)];

pub static CODEBUILD_LIST_PROJECTS: OperationSpec = OperationSpec {
    service: &CODEBUILD,
    name: "ListProjects",
    summary: "Gets a list of build project names",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::one_of(
            "SortBy",
            "sortBy",
            &["NAME", "CREATED_TIME", "LAST_MODIFIED_TIME"],
        ),
        FieldSpec::one_of("SortOrder", "sortOrder", SORT_ORDER),
    ],
    pagination: Some(PaginationSpec {
        input_token: "nextToken",
        output_token: "nextToken",
        items: Some("projects"),
        limit: None,
    }),
    default_select: None,
};

pub static CODEBUILD_BATCH_GET_PROJECTS: OperationSpec = OperationSpec {
    service: &CODEBUILD,
    name: "BatchGetProjects",
    summary: "Gets information about one or more build projects",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[FieldSpec::new("Name", "names", FieldKind::List(ScalarType::String)).required()],
    pagination: None,
    default_select: Some("projects"),
};

pub static CODEBUILD_CREATE_PROJECT: OperationSpec = OperationSpec {
    service: &CODEBUILD,
    name: "CreateProject",
    summary: "Creates a build project",
    impact: ConfirmImpact::Medium,
    target_param: Some("Name"),
    fields: &[
        FieldSpec::string("Name", "name").required(),
        FieldSpec::string("Description", "description"),
        FieldSpec::string("ServiceRole", "serviceRole").required(),
        FieldSpec::integer("TimeoutInMinute", "timeoutInMinutes"),
        FieldSpec::integer("QueuedTimeoutInMinute", "queuedTimeoutInMinutes"),
        FieldSpec::string("EncryptionKey", "encryptionKey"),
        FieldSpec::boolean("BadgeEnabled", "badgeEnabled"),
        FieldSpec::integer("ConcurrentBuildLimit", "concurrentBuildLimit"),
        FieldSpec::new("Tag", "tags", FieldKind::ObjectList)
            .describe("List of {key, value} objects"),
        FieldSpec::new("SecondarySource", "secondarySources", FieldKind::ObjectList),
        FieldSpec::nested("Source", "source", CB_SOURCE).required(),
        FieldSpec::nested("Artifacts", "artifacts", CB_ARTIFACTS).required(),
        FieldSpec::nested("Environment", "environment", CB_ENVIRONMENT).required(),
        FieldSpec::nested("LogsConfig", "logsConfig", CB_LOGS_CONFIG),
    ],
    pagination: None,
    default_select: Some("project"),
};

pub static CODEBUILD_DELETE_PROJECT: OperationSpec = OperationSpec {
    service: &CODEBUILD,
    name: "DeleteProject",
    summary: "Deletes a build project",
    impact: ConfirmImpact::High,
    target_param: Some("Name"),
    fields: &[FieldSpec::string("Name", "name").required()],
    pagination: None,
    default_select: Some("^Name"),
};

pub static CODEBUILD_START_BUILD: OperationSpec = OperationSpec {
    service: &CODEBUILD,
    name: "StartBuild",
    summary: "Starts running a build",
    impact: ConfirmImpact::Medium,
    target_param: Some("ProjectName"),
    fields: &[
        FieldSpec::string("ProjectName", "projectName").required(),
        FieldSpec::string("SourceVersion", "sourceVersion"),
        FieldSpec::string("BuildspecOverride", "buildspecOverride"),
        FieldSpec::integer("TimeoutInMinutesOverride", "timeoutInMinutesOverride"),
        FieldSpec::new(
            "EnvironmentVariablesOverride",
            "environmentVariablesOverride",
            FieldKind::ObjectList,
        ),
    ],
    pagination: None,
    default_select: Some("build"),
};

// ---------------------------------------------------------------------------
// Secrets Manager
// ---------------------------------------------------------------------------

pub static SECRETS_LIST_SECRETS: OperationSpec = OperationSpec {
    service: &SECRETS_MANAGER,
    name: "ListSecrets",
    summary: "Lists the secrets stored by this account",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::integer("MaxResult", "MaxResults"),
        FieldSpec::boolean("IncludePlannedDeletion", "IncludePlannedDeletion"),
        FieldSpec::new("Filter", "Filters", FieldKind::ObjectList)
            .describe("List of {Key, Values} objects"),
        FieldSpec::one_of("SortOrder", "SortOrder", &["asc", "desc"]),
    ],
    pagination: Some(PaginationSpec {
        input_token: "NextToken",
        output_token: "NextToken",
        items: Some("SecretList"),
        limit: Some("MaxResults"),
    }),
    default_select: None,
};

pub static SECRETS_GET_SECRET_VALUE: OperationSpec = OperationSpec {
    service: &SECRETS_MANAGER,
    name: "GetSecretValue",
    summary: "Retrieves the contents of a secret",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::string("SecretId", "SecretId").required(),
        FieldSpec::string("VersionId", "VersionId"),
        FieldSpec::string("VersionStage", "VersionStage"),
    ],
    pagination: None,
    default_select: None,
};

pub static SECRETS_CREATE_SECRET: OperationSpec = OperationSpec {
    service: &SECRETS_MANAGER,
    name: "CreateSecret",
    summary: "Creates a new secret",
    impact: ConfirmImpact::Medium,
    target_param: Some("Name"),
    fields: &[
        FieldSpec::string("Name", "Name").required(),
        FieldSpec::string("Description", "Description"),
        FieldSpec::string("KmsKeyId", "KmsKeyId"),
        FieldSpec::string("SecretString", "SecretString"),
        FieldSpec::string("ClientRequestToken", "ClientRequestToken"),
        FieldSpec::boolean("ForceOverwriteReplicaSecret", "ForceOverwriteReplicaSecret"),
        FieldSpec::new("Tag", "Tags", FieldKind::ObjectList),
    ],
    pagination: None,
    default_select: None,
};

pub static SECRETS_DELETE_SECRET: OperationSpec = OperationSpec {
    service: &SECRETS_MANAGER,
    name: "DeleteSecret",
    summary: "Deletes a secret, optionally without a recovery window",
    impact: ConfirmImpact::High,
    target_param: Some("SecretId"),
    fields: &[
        FieldSpec::string("SecretId", "SecretId").required(),
        FieldSpec::integer("RecoveryWindowInDay", "RecoveryWindowInDays"),
        FieldSpec::boolean("ForceDeleteWithoutRecovery", "ForceDeleteWithoutRecovery"),
    ],
    pagination: None,
    default_select: None,
};

// ---------------------------------------------------------------------------
// DynamoDB
// ---------------------------------------------------------------------------

pub static DYNAMODB_LIST_TABLES: OperationSpec = OperationSpec {
    service: &DYNAMODB,
    name: "ListTables",
    summary: "Returns an array of table names",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[FieldSpec::integer("Limit", "Limit")],
    pagination: Some(PaginationSpec {
        input_token: "ExclusiveStartTableName",
        output_token: "LastEvaluatedTableName",
        items: Some("TableNames"),
        limit: Some("Limit"),
    }),
    default_select: None,
};

pub static DYNAMODB_DESCRIBE_TABLE: OperationSpec = OperationSpec {
    service: &DYNAMODB,
    name: "DescribeTable",
    summary: "Returns information about a table",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[FieldSpec::string("TableName", "TableName").required()],
    pagination: None,
    default_select: Some("Table"),
};

pub static DYNAMODB_DELETE_TABLE: OperationSpec = OperationSpec {
    service: &DYNAMODB,
    name: "DeleteTable",
    summary: "Deletes a table and all of its items",
    impact: ConfirmImpact::High,
    target_param: Some("TableName"),
    fields: &[FieldSpec::string("TableName", "TableName").required()],
    pagination: None,
    default_select: Some("TableDescription"),
};

// ---------------------------------------------------------------------------
// CloudWatch Logs
// ---------------------------------------------------------------------------

pub static LOGS_DESCRIBE_LOG_GROUPS: OperationSpec = OperationSpec {
    service: &LOGS,
    name: "DescribeLogGroups",
    summary: "Lists the specified log groups",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::string("LogGroupNamePrefix", "logGroupNamePrefix"),
        FieldSpec::string("LogGroupNamePattern", "logGroupNamePattern"),
        FieldSpec::integer("Limit", "limit"),
        FieldSpec::new(
            "LogGroupIdentifier",
            "logGroupIdentifiers",
            FieldKind::List(ScalarType::String),
        ),
    ],
    pagination: Some(PaginationSpec {
        input_token: "nextToken",
        output_token: "nextToken",
        items: Some("logGroups"),
        limit: Some("limit"),
    }),
    default_select: None,
};

pub static LOGS_CREATE_LOG_GROUP: OperationSpec = OperationSpec {
    service: &LOGS,
    name: "CreateLogGroup",
    summary: "Creates a log group",
    impact: ConfirmImpact::Medium,
    target_param: Some("LogGroupName"),
    fields: &[
        FieldSpec::string("LogGroupName", "logGroupName").required(),
        FieldSpec::string("KmsKeyId", "kmsKeyId"),
        FieldSpec::one_of("LogGroupClass", "logGroupClass", &["STANDARD", "INFREQUENT_ACCESS"]),
        FieldSpec::new("Tag", "tags", FieldKind::Map),
    ],
    pagination: None,
    default_select: Some("^LogGroupName"),
};

pub static LOGS_PUT_RETENTION_POLICY: OperationSpec = OperationSpec {
    service: &LOGS,
    name: "PutRetentionPolicy",
    summary: "Sets the retention of a log group",
    impact: ConfirmImpact::Medium,
    target_param: Some("LogGroupName"),
    fields: &[
        FieldSpec::string("LogGroupName", "logGroupName").required(),
        FieldSpec::integer("RetentionInDays", "retentionInDays").required(),
    ],
    pagination: None,
    default_select: None,
};

pub static LOGS_GET_LOG_EVENTS: OperationSpec = OperationSpec {
    service: &LOGS,
    name: "GetLogEvents",
    summary: "Lists log events from a log stream",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::string("LogGroupName", "logGroupName"),
        FieldSpec::string("LogStreamName", "logStreamName").required(),
        FieldSpec::new("StartTime", "startTime", FieldKind::Scalar(ScalarType::Timestamp)),
        FieldSpec::new("EndTime", "endTime", FieldKind::Scalar(ScalarType::Timestamp)),
        FieldSpec::integer("Limit", "limit"),
        FieldSpec::boolean("StartFromHead", "startFromHead"),
    ],
    pagination: Some(PaginationSpec {
        input_token: "nextToken",
        output_token: "nextForwardToken",
        items: Some("events"),
        limit: Some("limit"),
    }),
    default_select: None,
};

pub static LOGS_DELETE_LOG_GROUP: OperationSpec = OperationSpec {
    service: &LOGS,
    name: "DeleteLogGroup",
    summary: "Deletes a log group and its archived events",
    impact: ConfirmImpact::High,
    target_param: Some("LogGroupName"),
    fields: &[FieldSpec::string("LogGroupName", "logGroupName").required()],
    pagination: None,
    default_select: Some("^LogGroupName"),
};

// ---------------------------------------------------------------------------
// Systems Manager
// ---------------------------------------------------------------------------

pub static SSM_GET_PARAMETER: OperationSpec = OperationSpec {
    service: &SSM,
    name: "GetParameter",
    summary: "Gets information about a single parameter",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::string("Name", "Name").required(),
        FieldSpec::boolean("WithDecryption", "WithDecryption"),
    ],
    pagination: None,
    default_select: Some("Parameter"),
};

pub static SSM_GET_PARAMETERS_BY_PATH: OperationSpec = OperationSpec {
    service: &SSM,
    name: "GetParametersByPath",
    summary: "Retrieves parameters in a specific hierarchy",
    impact: ConfirmImpact::None,
    target_param: None,
    fields: &[
        FieldSpec::string("Path", "Path").required(),
        FieldSpec::boolean("Recursive", "Recursive"),
        FieldSpec::boolean("WithDecryption", "WithDecryption"),
        FieldSpec::integer("MaxResult", "MaxResults"),
        FieldSpec::new("ParameterFilter", "ParameterFilters", FieldKind::ObjectList),
    ],
    pagination: Some(PaginationSpec {
        input_token: "NextToken",
        output_token: "NextToken",
        items: Some("Parameters"),
        limit: Some("MaxResults"),
    }),
    default_select: None,
};

pub static SSM_PUT_PARAMETER: OperationSpec = OperationSpec {
    service: &SSM,
    name: "PutParameter",
    summary: "Adds or overwrites a parameter",
    impact: ConfirmImpact::Medium,
    target_param: Some("Name"),
    fields: &[
        FieldSpec::string("Name", "Name").required(),
        FieldSpec::string("Value", "Value").required(),
        FieldSpec::one_of("Type", "Type", &["String", "StringList", "SecureString"]),
        FieldSpec::string("Description", "Description"),
        FieldSpec::string("KeyId", "KeyId"),
        FieldSpec::boolean("Overwrite", "Overwrite"),
        FieldSpec::one_of("Tier", "Tier", &["Standard", "Advanced", "Intelligent-Tiering"]),
        FieldSpec::new("Tag", "Tags", FieldKind::ObjectList),
    ],
    pagination: None,
    default_select: Some("Version"),
};

pub static SSM_DELETE_PARAMETER: OperationSpec = OperationSpec {
    service: &SSM,
    name: "DeleteParameter",
    summary: "Deletes a parameter",
    impact: ConfirmImpact::High,
    target_param: Some("Name"),
    fields: &[FieldSpec::string("Name", "Name").required()],
    pagination: None,
    default_select: Some("^Name"),
};

static OPERATIONS: [&OperationSpec; 21] = [
    &CODEBUILD_BATCH_GET_PROJECTS,
    &CODEBUILD_CREATE_PROJECT,
    &CODEBUILD_DELETE_PROJECT,
    &CODEBUILD_LIST_PROJECTS,
    &CODEBUILD_START_BUILD,
    &DYNAMODB_DELETE_TABLE,
    &DYNAMODB_DESCRIBE_TABLE,
    &DYNAMODB_LIST_TABLES,
    &LOGS_CREATE_LOG_GROUP,
    &LOGS_DELETE_LOG_GROUP,
    &LOGS_DESCRIBE_LOG_GROUPS,
    &LOGS_GET_LOG_EVENTS,
    &LOGS_PUT_RETENTION_POLICY,
    &SECRETS_CREATE_SECRET,
    &SECRETS_DELETE_SECRET,
    &SECRETS_GET_SECRET_VALUE,
    &SECRETS_LIST_SECRETS,
    &SSM_DELETE_PARAMETER,
    &SSM_GET_PARAMETER,
    &SSM_GET_PARAMETERS_BY_PATH,
    &SSM_PUT_PARAMETER,
];

/// All known services, sorted by id
pub fn services() -> &'static [&'static ServiceSpec] {
    &SERVICES
}

/// All known operations, sorted by service then name
pub fn operations() -> &'static [&'static OperationSpec] {
    &OPERATIONS
}

/// Case-insensitive service lookup
pub fn find_service(id: &str) -> Option<&'static ServiceSpec> {
    SERVICES
        .iter()
        .copied()
        .find(|s| s.id.eq_ignore_ascii_case(id))
}

/// Operations belonging to `service`
pub fn operations_for(service: &str) -> Vec<&'static OperationSpec> {
    OPERATIONS
        .iter()
        .copied()
        .filter(|op| op.service.id.eq_ignore_ascii_case(service))
        .collect()
}

/// Case-insensitive operation lookup
pub fn find(service: &str, operation: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().copied().find(|op| {
        op.service.id.eq_ignore_ascii_case(service) && op.name.eq_ignore_ascii_case(operation)
    })
}

/// Like [`find`], but an unknown pair is an error
pub fn lookup(service: &str, operation: &str) -> Result<&'static OperationSpec> {
    find(service, operation).ok_or_else(|| CoreError::UnknownOperation {
        service: service.to_string(),
        operation: operation.to_string(),
    })
}
