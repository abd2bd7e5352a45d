use super::entity;
use crate::api::computed;
use crate::database::schema::{
    EntitySchema, FieldDef, FilterDef, Hop, JoinDef, OrderDef, Partition, Stamps,
};

pub const COURSE_TYPES: &[&str] = &["core", "elective", "laboratory", "seminar", "project", "internship"];
pub const SEMESTERS: &[&str] = &["fall", "spring", "summer"];
pub const ENROLLMENT_STATUSES: &[&str] = &["enrolled", "dropped", "completed", "failed", "withdrawn"];
pub const ASSIGNMENT_TYPES: &[&str] = &["homework", "quiz", "midterm", "final", "project", "presentation", "lab"];
pub const SUBMISSION_STATUSES: &[&str] = &["pending", "submitted", "graded", "late", "missing"];

const VIA_DEPARTMENT: &[Hop] = &[Hop { column: "department", table: "departments" }];
const VIA_COURSE: &[Hop] = &[Hop { column: "course", table: "courses" }];
const VIA_STUDENT: &[Hop] = &[Hop { column: "student", table: "students" }];
const VIA_OFFERING_COURSE: &[Hop] = &[
    Hop { column: "course_offering", table: "offerings" },
    Hop { column: "course", table: "courses" },
];

pub static COURSE: EntitySchema = EntitySchema {
    name: "course",
    table: "courses",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::text("course_code", 20).unique(),
        FieldDef::text("course_name", 200),
        FieldDef::owner("department", "departments"),
        FieldDef::choice("course_type", COURSE_TYPES),
        FieldDef::integer("credit_hours"),
        FieldDef::integer("contact_hours"),
        FieldDef::long_text("description"),
        FieldDef::ref_list("prerequisites", "courses", "course_prerequisites", "course_id", "prerequisite_id"),
        FieldDef::long_text("syllabus").blank(),
        FieldDef::long_text("learning_objectives").blank(),
        FieldDef::long_text("assessment_methods").blank(),
        FieldDef::long_text("textbooks").blank(),
        FieldDef::long_text("reference_books").blank(),
        FieldDef::boolean("is_active").default_bool(true),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[JoinDef { name: "department_name", path: VIA_DEPARTMENT, column: "name" }],
    counts: &[],
    filters: &[
        FilterDef::exact("department"),
        FilterDef::exact("course_type"),
        FilterDef::boolean("is_active"),
    ],
    order: &[OrderDef::asc("course_code")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static OFFERING: EntitySchema = EntitySchema {
    name: "course offering",
    table: "offerings",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("course", "courses"),
        FieldDef::owner("instructor", "faculty"),
        FieldDef::choice("semester", SEMESTERS),
        FieldDef::integer("year"),
        FieldDef::text("section", 10),
        FieldDef::integer("max_enrollment"),
        FieldDef::integer("current_enrollment").default_int(0),
        FieldDef::text("classroom", 50).blank(),
        FieldDef::long_text("schedule").blank(),
        FieldDef::boolean("is_active").default_bool(true),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[&["course", "semester", "year", "section"]],
    joins: &[
        JoinDef { name: "course_code", path: VIA_COURSE, column: "course_code" },
        JoinDef { name: "course_name", path: VIA_COURSE, column: "course_name" },
        JoinDef {
            name: "instructor_name",
            path: &[Hop { column: "instructor", table: "faculty" }],
            column: "first_name",
        },
    ],
    counts: &[],
    filters: &[
        FilterDef::exact("semester"),
        FilterDef::integer("year"),
        FilterDef::exact("instructor"),
        FilterDef::exact("course"),
    ],
    order: &[OrderDef::desc("year"), OrderDef::asc("semester"), OrderDef::asc("section")],
    computed: Some(computed::offering_fields),
    hook: None,
    triggers: &[],
};

pub static ENROLLMENT: EntitySchema = EntitySchema {
    name: "enrollment",
    table: "enrollments",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("student", "students"),
        FieldDef::owner("course_offering", "offerings"),
        FieldDef::choice("status", ENROLLMENT_STATUSES).default_str("enrolled"),
        FieldDef::text("final_grade", 5).blank(),
        FieldDef::decimal("grade_points", 4, 2).nullable(),
        FieldDef::decimal("attendance_percentage", 5, 2).nullable(),
    ],
    stamps: Stamps::created("enrollment_date"),
    unique_together: &[&["student", "course_offering"]],
    joins: &[
        JoinDef { name: "student_name", path: VIA_STUDENT, column: "first_name" },
        JoinDef { name: "student_code", path: VIA_STUDENT, column: "student_id" },
        JoinDef { name: "course_code", path: VIA_OFFERING_COURSE, column: "course_code" },
        JoinDef { name: "course_name", path: VIA_OFFERING_COURSE, column: "course_name" },
    ],
    counts: &[],
    filters: &[
        FilterDef::exact("student"),
        FilterDef::exact("course_offering"),
        FilterDef::exact("status"),
    ],
    order: &[OrderDef::desc("enrollment_date")],
    computed: None,
    hook: None,
    triggers: ENROLLMENT_COUNTER,
};

pub static ASSIGNMENT: EntitySchema = EntitySchema {
    name: "assignment",
    table: "assignments",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("course_offering", "offerings"),
        FieldDef::text("title", 200),
        FieldDef::long_text("description"),
        FieldDef::choice("assignment_type", ASSIGNMENT_TYPES),
        FieldDef::integer("total_marks"),
        FieldDef::decimal("weight_percentage", 5, 2),
        FieldDef::datetime("due_date"),
        FieldDef::boolean("is_active").default_bool(true),
    ],
    stamps: Stamps::STANDARD,
    unique_together: &[],
    joins: &[
        JoinDef { name: "course_code", path: VIA_OFFERING_COURSE, column: "course_code" },
        JoinDef { name: "course_name", path: VIA_OFFERING_COURSE, column: "course_name" },
    ],
    counts: &[],
    filters: &[FilterDef::exact("course_offering"), FilterDef::exact("assignment_type")],
    order: &[OrderDef::asc("due_date")],
    computed: None,
    hook: None,
    triggers: &[],
};

pub static STUDENT_ASSIGNMENT: EntitySchema = EntitySchema {
    name: "student assignment",
    table: "student_assignments",
    partition: Partition::Tenant,
    fields: &[
        FieldDef::owner("student", "students"),
        FieldDef::owner("assignment", "assignments"),
        FieldDef::datetime("submission_date").nullable(),
        FieldDef::long_text("submission_text").blank(),
        FieldDef::decimal("marks_obtained", 5, 2).nullable(),
        FieldDef::long_text("feedback").blank(),
        FieldDef::choice("status", SUBMISSION_STATUSES).default_str("pending"),
        FieldDef::nullable_ref("graded_by", "users"),
        FieldDef::datetime("graded_on").nullable().read_only(),
    ],
    stamps: Stamps { created: None, updated: None },
    unique_together: &[&["student", "assignment"]],
    joins: &[
        JoinDef { name: "student_name", path: VIA_STUDENT, column: "first_name" },
        JoinDef { name: "student_code", path: VIA_STUDENT, column: "student_id" },
        JoinDef {
            name: "assignment_title",
            path: &[Hop { column: "assignment", table: "assignments" }],
            column: "title",
        },
        JoinDef {
            name: "graded_by_name",
            path: &[Hop { column: "graded_by", table: "users" }],
            column: "username",
        },
    ],
    counts: &[],
    filters: &[
        FilterDef::exact("student"),
        FilterDef::exact("assignment"),
        FilterDef::exact("status"),
    ],
    order: &[],
    computed: None,
    hook: None,
    triggers: &[],
};

entity!(Courses, COURSE);
entity!(Offerings, OFFERING);
entity!(Enrollments, ENROLLMENT);
entity!(Assignments, ASSIGNMENT);
entity!(StudentAssignments, STUDENT_ASSIGNMENT);

/// Keeps `offerings.current_enrollment` in step with enrollment rows, including rows removed
/// by a cascade from their student or offering. The counter never goes below zero.
const ENROLLMENT_COUNTER: &[&str] = &[
    r#"CREATE TRIGGER IF NOT EXISTS "enrollments_count_insert"
AFTER INSERT ON "enrollments"
BEGIN
    UPDATE "offerings" SET "current_enrollment" = "current_enrollment" + 1
    WHERE "id" = NEW."course_offering";
END"#,
    r#"CREATE TRIGGER IF NOT EXISTS "enrollments_count_delete"
AFTER DELETE ON "enrollments"
BEGIN
    UPDATE "offerings" SET "current_enrollment" = MAX("current_enrollment" - 1, 0)
    WHERE "id" = OLD."course_offering";
END"#,
    r#"CREATE TRIGGER IF NOT EXISTS "enrollments_count_move"
AFTER UPDATE OF "course_offering" ON "enrollments"
WHEN OLD."course_offering" IS NOT NEW."course_offering"
BEGIN
    UPDATE "offerings" SET "current_enrollment" = MAX("current_enrollment" - 1, 0)
    WHERE "id" = OLD."course_offering";
    UPDATE "offerings" SET "current_enrollment" = "current_enrollment" + 1
    WHERE "id" = NEW."course_offering";
END"#,
];
