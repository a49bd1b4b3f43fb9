use crate::form::{Field, Schema};

/// Schema of the todo form: a required `title` and up to `max_tasks`
/// tasks, each with required `content` and a `completed` checkbox.
///
/// An empty task list is valid.
#[must_use]
pub fn todos_schema(max_tasks: usize) -> Schema {
    let task = Schema::new()
        .field(Field::text("content").required("Content is required"))
        .field(Field::boolean("completed"));

    Schema::new()
        .field(Field::text("title").required("Title is required"))
        .field(
            Field::list("tasks", task)
                .max_items(max_tasks, &format!("You can add at most {max_tasks} tasks")),
        )
}
