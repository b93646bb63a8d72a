use std::sync::LazyLock;

use crate::models::{ProbeCategory, ProbeId};

/// One inspectable AWS service known to this build.
///
/// Membership is closed per version: probes are selected by `ProbeId` from
/// this table, never discovered dynamically.
#[derive(Debug, Clone, Copy)]
pub struct ServiceDefinition {
    pub probe_id: &'static str,
    pub display_name: &'static str,
    pub category: ProbeCategory,
}

const SERVICES: &[(&str, &str, ProbeCategory)] = &[
    // Compute
    ("ec2", "EC2 Instances", ProbeCategory::Compute),
    ("ec2-reserved", "EC2 Reserved Instances", ProbeCategory::Compute),
    ("ec2-spot", "EC2 Spot Fleet", ProbeCategory::Compute),
    ("lambda", "Lambda Functions", ProbeCategory::Compute),
    ("ecs", "ECS Clusters", ProbeCategory::Compute),
    ("eks", "EKS Clusters", ProbeCategory::Compute),
    ("fargate", "Fargate Tasks", ProbeCategory::Compute),
    ("batch", "Batch Compute Environments", ProbeCategory::Compute),
    ("lightsail", "Lightsail Instances", ProbeCategory::Compute),
    ("elastic-beanstalk", "Elastic Beanstalk Environments", ProbeCategory::Compute),
    ("app-runner", "App Runner Services", ProbeCategory::Compute),
    ("outposts", "Outposts Capacity", ProbeCategory::Compute),
    // Storage
    ("s3", "S3 Buckets", ProbeCategory::Storage),
    ("s3-glacier", "S3 Glacier Archives", ProbeCategory::Storage),
    ("ebs", "EBS Volumes", ProbeCategory::Storage),
    ("ebs-snapshots", "EBS Snapshots", ProbeCategory::Storage),
    ("efs", "EFS File Systems", ProbeCategory::Storage),
    ("fsx", "FSx File Systems", ProbeCategory::Storage),
    ("backup", "AWS Backup Vaults", ProbeCategory::Storage),
    ("storage-gateway", "Storage Gateway", ProbeCategory::Storage),
    // Database
    ("rds", "RDS Instances", ProbeCategory::Database),
    ("rds-snapshots", "RDS Snapshots", ProbeCategory::Database),
    ("aurora", "Aurora Clusters", ProbeCategory::Database),
    ("dynamodb", "DynamoDB Tables", ProbeCategory::Database),
    ("elasticache", "ElastiCache Clusters", ProbeCategory::Database),
    ("redshift", "Redshift Clusters", ProbeCategory::Database),
    ("documentdb", "DocumentDB Clusters", ProbeCategory::Database),
    ("neptune", "Neptune Clusters", ProbeCategory::Database),
    ("timestream", "Timestream Databases", ProbeCategory::Database),
    ("memorydb", "MemoryDB Clusters", ProbeCategory::Database),
    ("keyspaces", "Keyspaces Tables", ProbeCategory::Database),
    // Networking
    ("vpc", "VPC Resources", ProbeCategory::Networking),
    ("nat-gateway", "NAT Gateways", ProbeCategory::Networking),
    ("elastic-ip", "Elastic IPs", ProbeCategory::Networking),
    ("elb", "Load Balancers", ProbeCategory::Networking),
    ("cloudfront", "CloudFront Distributions", ProbeCategory::Networking),
    ("route53", "Route 53 Hosted Zones", ProbeCategory::Networking),
    ("direct-connect", "Direct Connect Links", ProbeCategory::Networking),
    ("transit-gateway", "Transit Gateways", ProbeCategory::Networking),
    ("vpn", "Site-to-Site VPN", ProbeCategory::Networking),
    ("global-accelerator", "Global Accelerator", ProbeCategory::Networking),
    ("api-gateway", "API Gateway", ProbeCategory::Networking),
    ("data-transfer", "Data Transfer", ProbeCategory::Networking),
    // Analytics
    ("athena", "Athena Workgroups", ProbeCategory::Analytics),
    ("emr", "EMR Clusters", ProbeCategory::Analytics),
    ("kinesis", "Kinesis Streams", ProbeCategory::Analytics),
    ("firehose", "Kinesis Firehose", ProbeCategory::Analytics),
    ("glue", "Glue Jobs", ProbeCategory::Analytics),
    ("quicksight", "QuickSight Subscriptions", ProbeCategory::Analytics),
    ("opensearch", "OpenSearch Domains", ProbeCategory::Analytics),
    ("msk", "MSK Clusters", ProbeCategory::Analytics),
    ("lake-formation", "Lake Formation", ProbeCategory::Analytics),
    ("data-pipeline", "Data Pipeline", ProbeCategory::Analytics),
    // Security
    ("kms", "KMS Keys", ProbeCategory::Security),
    ("secrets-manager", "Secrets Manager", ProbeCategory::Security),
    ("waf", "WAF Web ACLs", ProbeCategory::Security),
    ("shield", "Shield Advanced", ProbeCategory::Security),
    ("guardduty", "GuardDuty Detectors", ProbeCategory::Security),
    ("inspector", "Inspector Assessments", ProbeCategory::Security),
    ("macie", "Macie Jobs", ProbeCategory::Security),
    ("acm", "Certificate Manager", ProbeCategory::Security),
    ("cognito", "Cognito User Pools", ProbeCategory::Security),
    // Integration
    ("sqs", "SQS Queues", ProbeCategory::Integration),
    ("sns", "SNS Topics", ProbeCategory::Integration),
    ("eventbridge", "EventBridge Buses", ProbeCategory::Integration),
    ("step-functions", "Step Functions", ProbeCategory::Integration),
    ("mq", "Amazon MQ Brokers", ProbeCategory::Integration),
    ("appsync", "AppSync APIs", ProbeCategory::Integration),
    ("ses", "SES Sending", ProbeCategory::Integration),
    // Management
    ("cloudwatch", "CloudWatch Metrics", ProbeCategory::Management),
    ("cloudwatch-logs", "CloudWatch Logs", ProbeCategory::Management),
    ("cloudtrail", "CloudTrail Trails", ProbeCategory::Management),
    ("config", "AWS Config Rules", ProbeCategory::Management),
    ("systems-manager", "Systems Manager", ProbeCategory::Management),
    ("organizations", "Organizations", ProbeCategory::Management),
    ("support-plan", "Support Plan", ProbeCategory::Management),
    ("trusted-advisor", "Trusted Advisor", ProbeCategory::Management),
    // Other
    ("sagemaker", "SageMaker Resources", ProbeCategory::Other),
    ("bedrock", "Bedrock Usage", ProbeCategory::Other),
    ("rekognition", "Rekognition Usage", ProbeCategory::Other),
    ("transcribe", "Transcribe Usage", ProbeCategory::Other),
    ("translate", "Translate Usage", ProbeCategory::Other),
    ("polly", "Polly Usage", ProbeCategory::Other),
    ("iot-core", "IoT Core", ProbeCategory::Other),
    ("gamelift", "GameLift Fleets", ProbeCategory::Other),
    ("workspaces", "WorkSpaces", ProbeCategory::Other),
    ("appstream", "AppStream Fleets", ProbeCategory::Other),
    ("connect", "Amazon Connect", ProbeCategory::Other),
    ("chime", "Chime Usage", ProbeCategory::Other),
];

/// Every service probe this build knows about, in registration order.
pub static SERVICE_REGISTRY: LazyLock<Vec<ServiceDefinition>> = LazyLock::new(|| {
    SERVICES
        .iter()
        .map(|&(probe_id, display_name, category)| ServiceDefinition {
            probe_id,
            display_name,
            category,
        })
        .collect()
});

/// Category for a known probe id; `Other` for ids outside the registry
/// (synthetic catalogs, forward-compat inputs).
pub fn category_for(probe_id: &ProbeId) -> ProbeCategory {
    SERVICE_REGISTRY
        .iter()
        .find(|def| def.probe_id == probe_id.as_str())
        .map(|def| def.category)
        .unwrap_or(ProbeCategory::Other)
}
