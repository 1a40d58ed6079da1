pub const ENROLLMENT: &str = r#"[
    {
        "nombreCurso": "Matemáticas",
        "nombreSeccion": "Sección A",
        "estudiantes": [
            {"nombre": "Juan Pérez"},
            {"nombre": "María García"}
        ]
    },
    {
        "nombreCurso": "Historia",
        "nombreSeccion": "Sección B",
        "estudiantes": [
            {"nombre": "Carlos López"}
        ]
    }
]"#;

pub const EVALUATIONS: &str = r#"{
    "curso": "Matemáticas",
    "seccion": "Sección A",
    "evaluaciones": [
        {
            "estudianteId": "001",
            "nombre": "Juan Pérez",
            "notas": [80, 85, 90]
        },
        {
            "estudianteId": "002",
            "nombre": "María García",
            "notas": [50, 55, 45]
        }
    ]
}"#;
