use super::entity;
use crate::api::computed;
use crate::database::schema::{
    EntitySchema, FieldDef, FilterDef, Hop, JoinDef, OrderDef, Partition, Stamps,
};

pub const DEAN_STATUSES: &[&str] = &["active", "inactive", "retired"];
pub const DECISION_TYPES: &[&str] = &[
    "policy",
    "academic",
    "disciplinary",
    "budget",
    "faculty_hiring",
    "course_approval",
    "student_appeal",
    "other",
];
pub const DECISION_STATUSES: &[&str] = &["pending", "approved", "rejected", "under_review", "implemented"];
pub const MEETING_TYPES: &[&str] = &[
    "department",
    "faculty",
    "academic_council",
    "administrative",
    "disciplinary",
    "other",
];
pub const MEETING_STATUSES: &[&str] = &["scheduled", "in_progress", "completed", "cancelled", "postponed"];
pub const BUDGET_TYPES: &[&str] = &[
    "operational",
    "capital",
    "research",
    "infrastructure",
    "staff",
    "student_activities",
];
pub const BUDGET_STATUSES: &[&str] = &["draft", "pending_approval", "approved", "rejected", "under_review"];
pub const REPORT_TYPES: &[&str] = &["monthly", "quarterly", "annual", "special", "performance"];

const VIA_DEAN_FACULTY: &[Hop] = &[
    Hop { column: "dean", table: "deans" },
    Hop { column: "faculty", table: "faculty" },
];
const VIA_DEAN_DEPARTMENT: &[Hop] = &[
    Hop { column: "dean", table: "deans" },
    Hop { column: "department", table: "departments" },
];
const DEAN_JOINS: &[JoinDef] = &[
    JoinDef { name: "dean_name", path: VIA_DEAN_FACULTY, column: "first_name" },
    JoinDef { name: "department_name", path: VIA_DEAN_DEPARTMENT, column: "name" },
];

pub static DEAN: EntitySchema = EntitySchema {
    name: "dean",
    table: "deans",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("faculty", "faculty").unique(),
        FieldDef::owner("department", "departments"),
        FieldDef::date("appointed_date"),
        FieldDef::date("term_end_date").nullable(),
        FieldDef::choice("status", DEAN_STATUSES).default_str("active"),
        FieldDef::long_text("responsibilities").blank(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[
        JoinDef {
            name: "faculty_name",
            path: &[Hop { column: "faculty", table: "faculty" }],
            column: "first_name",
        },
        JoinDef {
            name: "department_name",
            path: &[Hop { column: "department", table: "departments" }],
            column: "name",
        },
    ],
    counts: &[],
    filters: &[FilterDef::exact("department"), FilterDef::exact("status")],
    order: &[OrderDef::desc("appointed_date")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static DECISION: EntitySchema = EntitySchema {
    name: "decision",
    table: "decisions",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("dean", "deans"),
        FieldDef::choice("decision_type", DECISION_TYPES),
        FieldDef::text("title", 200),
        FieldDef::long_text("description"),
        FieldDef::datetime("decision_date"),
        FieldDef::choice("status", DECISION_STATUSES).default_str("pending"),
        FieldDef::datetime("implementation_date").nullable(),
        FieldDef::long_text("affected_parties").blank(),
        FieldDef::decimal("budget_impact", 12, 2).nullable(),
        FieldDef::long_text("remarks").blank(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: DEAN_JOINS,
    counts: &[],
    filters: &[
        FilterDef::exact("dean"),
        FilterDef::exact("decision_type"),
        FilterDef::exact("status"),
    ],
    order: &[OrderDef::desc("decision_date")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static MEETING: EntitySchema = EntitySchema {
    name: "meeting",
    table: "meetings",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("dean", "deans"),
        FieldDef::choice("meeting_type", MEETING_TYPES),
        FieldDef::text("title", 200),
        FieldDef::long_text("description"),
        FieldDef::datetime("meeting_date"),
        FieldDef::text("location", 200),
        FieldDef::long_text("agenda"),
        FieldDef::ref_list("attendees", "users", "meeting_attendees", "meeting_id", "user_id"),
        FieldDef::choice("status", MEETING_STATUSES).default_str("scheduled"),
        FieldDef::long_text("minutes").blank(),
        FieldDef::long_text("action_items").blank(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: DEAN_JOINS,
    counts: &[],
    filters: &[
        FilterDef::exact("dean"),
        FilterDef::exact("meeting_type"),
        FilterDef::exact("status"),
    ],
    order: &[OrderDef::desc("meeting_date")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static BUDGET: EntitySchema = EntitySchema {
    name: "budget",
    table: "budgets",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("dean", "deans"),
        FieldDef::choice("budget_type", BUDGET_TYPES),
        FieldDef::text("fiscal_year", 10),
        FieldDef::text("title", 200),
        FieldDef::long_text("description"),
        FieldDef::decimal("requested_amount", 12, 2),
        FieldDef::decimal("approved_amount", 12, 2).nullable(),
        FieldDef::decimal("spent_amount", 12, 2).default_decimal("0.00"),
        FieldDef::choice("status", BUDGET_STATUSES).default_str("draft"),
        FieldDef::long_text("justification"),
        FieldDef::nullable_ref("approved_by", "users"),
        FieldDef::datetime("approved_date").nullable(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[
        JoinDef { name: "dean_name", path: VIA_DEAN_FACULTY, column: "first_name" },
        JoinDef { name: "department_name", path: VIA_DEAN_DEPARTMENT, column: "name" },
        JoinDef {
            name: "approved_by_name",
            path: &[Hop { column: "approved_by", table: "users" }],
            column: "username",
        },
    ],
    counts: &[],
    filters: &[
        FilterDef::exact("dean"),
        FilterDef::exact("budget_type"),
        FilterDef::exact("fiscal_year"),
        FilterDef::exact("status"),
    ],
    order: &[OrderDef::desc("fiscal_year"), OrderDef::desc("created_at")],
    computed: Some(computed::budget_fields),
    hook: None,
    triggers: &[],
};

pub static REPORT: EntitySchema = EntitySchema {
    name: "report",
    table: "reports",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("dean", "deans"),
        FieldDef::choice("report_type", REPORT_TYPES),
        FieldDef::text("title", 200),
        FieldDef::text("report_period", 50),
        FieldDef::long_text("content"),
        FieldDef::json("statistics").default_object(),
        FieldDef::long_text("achievements").blank(),
        FieldDef::long_text("challenges").blank(),
        FieldDef::long_text("recommendations").blank(),
        FieldDef::text("submitted_to", 200).blank(),
        FieldDef::datetime("submission_date").nullable(),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: DEAN_JOINS,
    counts: &[],
    filters: &[FilterDef::exact("dean"), FilterDef::exact("report_type")],
    order: &[OrderDef::desc("created_at")],
    computed: None,
    hook: None,
    triggers: &[],
};

entity!(Deans, DEAN);
entity!(Decisions, DECISION);
entity!(Meetings, MEETING);
entity!(Budgets, BUDGET);
entity!(Reports, REPORT);
