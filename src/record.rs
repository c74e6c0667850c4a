/*!
The records the institute keeps: students, courses, and the enrollments that
tie them together.
*/
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Student {
    pub id: i64,
    pub nombre: String,
    pub apellidos: String,
    /// Stored exactly as entered; never parsed.
    pub fecha_nacimiento: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Course {
    pub id: i64,
    pub descripcion: String,
    /// Duration in hours.
    pub horas: i64,
}

/// A row of the `inscripciones` table, references and all.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Enrollment {
    pub id: i64,
    pub fecha: String,
    pub estudiante_id: i64,
    pub curso_id: i64,
}

/**
An enrollment as it's shown in the listing: the student's full name and the
course description instead of the ids.
*/
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnrollmentListing {
    pub id: i64,
    pub fecha: String,
    pub estudiante: String,
    pub curso: String,
}

/// One `<option>` of a dropdown: a row id and the text to show for it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Choice {
    pub id: i64,
    pub label: String,
    pub selected: bool,
}

impl Choice {
    /// Mark whichever of `choices` has id `id` as selected.
    pub fn select(choices: &mut [Choice], id: i64) {
        for c in choices.iter_mut() {
            c.selected = c.id == id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_marks_only_matching_choice() {
        let mut choices = vec![
            Choice { id: 1, label: "Ana Díaz".to_owned(), selected: false },
            Choice { id: 2, label: "Luis Pérez".to_owned(), selected: true },
            Choice { id: 3, label: "Eva Gil".to_owned(), selected: false },
        ];

        Choice::select(&mut choices, 3);
        let selected: Vec<i64> = choices.iter()
            .filter(|c| c.selected)
            .map(|c| c.id)
            .collect();
        assert_eq!(selected, vec![3]);

        Choice::select(&mut choices, 42);
        assert!(choices.iter().all(|c| !c.selected));
    }
}
