// Built-in category → word lists.

pub(super) const BUILTIN_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Alimentos",
        &[
            "anafre", "tamal", "yuca", "plátano", "maduro", "tamarindo", "coco", "piña",
            "mango", "guayaba", "chicharrón", "gallo pinto", "frijoles", "arroz", "tortilla",
            "quesillo", "crema", "mantequilla", "chuleta", "pollo con tajadas", "pescado frito",
            "cebiche", "tamales de elote", "atol de elote", "chichas", "horchata", "semita",
            "pan de yema", "rosquillas", "empanadas", "pastelitos", "sopa de mondongo",
            "sopa de caracol", "anafre de carne", "carne asada", "pinchos", "chorizo",
            "longaniza", "moronga", "chorizo nicaragüense", "queso seco", "cuajada",
            "leche agria", "chocolate", "café", "tiste", "pinolillo", "atolillo", "chuco",
            "chichón", "nacátamal",
        ],
    ),
    (
        "Objetos cotidianos",
        &[
            "chimbomba", "mecapal", "sombrero de paja", "hamaca", "chinchorro", "petate",
            "jícara", "guacal", "tapiscar", "cántaro", "tinaja", "olla de barro", "comal",
            "metate", "mano de piedra", "pilón", "cedazo", "tamiz", "cernidor",
            "escoba de zacate", "rastrillo", "azada", "machete", "hacha", "serrucho", "clavo",
            "martillo", "alicate", "destornillador", "taladro", "sierra", "lijadora", "pintura",
            "brocha", "rodillo", "escalera", "andamio", "cinta métrica", "nivel", "plomada",
            "escuadra", "sierra circular", "lijadora orbital", "taladro percutor", "soplete",
            "soldador", "pinzas", "tenazas", "cortador de alambre", "alicates de corte",
            "llave inglesa",
        ],
    ),
    (
        "Ciudades",
        &[
            "Managua", "León", "Granada", "Masaya", "Chinandega", "Matagalpa", "Estelí",
            "Jinotega", "Nueva Segovia", "Madriz", "Chontales", "Río San Juan", "Carazo",
            "Boaco", "Rivas", "Zelaya", "Bluefields", "Puerto Cabezas", "San Carlos", "Ocotal",
            "Somoto", "Juigalpa", "El Rama", "Corn Islands", "Little Corn Island",
            "Big Corn Island", "San Juan del Sur", "Ometepe", "Isla de Ometepe",
            "Volcán Concepción", "Volcán Maderas", "Laguna de Apoyo", "Cataratas de Apoyo",
            "Reserva Biológica Indio-Maíz", "Parque Nacional Volcán Masaya", "Catedral de León",
            "Muralla de León", "Basílica de Sutiaba", "Puerto Salvador Allende",
            "Aeropuerto Internacional Augusto C. Sandino", "Lago de Nicaragua",
            "Lago Cocibolca", "Río Tipitapa", "Canal de Nicaragua", "Puerto Corinto",
            "Puerto Sandino", "El Bluff", "Monkey Point", "Kukra Hill", "Pearl Lagoon",
            "La Esperanza", "El Castillo",
        ],
    ),
    (
        "Animales",
        &[
            "guatusa", "pizote", "tamandúa", "perezoso", "mono araña", "mono capuchino",
            "jaguar", "puma", "ocelote", "tigrillo", "danta", "tapir", "manatí", "caimán",
            "cocodrilo", "iguana", "boa", "coralillo", "tamagás", "rana arborícola", "sapo",
            "salamandra", "pez diablo", "mojarra", "guapote", "róbalo", "sábalo", "bagre",
            "tiburón", "raya", "tortuga marina", "tortuga carey", "tortuga baula", "quetzal",
            "guacamaya", "lorito", "papagayo", "colibrí", "tucán", "pájaro carpintero",
            "águila harpía", "halcón peregrino", "buitre", "zopilote", "gallina de monte",
            "pavo real", "pavón", "chachalaca", "paujil", "hocofaisán",
        ],
    ),
    (
        "Profesiones",
        &[
            "campesino", "ganadero", "pescador", "minero", "maderero", "caficultor",
            "cacaotero", "tabacalero", "azucarero", "salineros", "artesano", "albañil",
            "carpintero", "herrero", "plomero", "electricista", "mecánico", "chofer", "taxista",
            "mototaxista", "piloto", "marinero", "cocinero", "mesero", "panadero", "pastelero",
            "carnicero", "lechero", "vendedor ambulante", "comerciante", "tendero", "bodeguero",
            "farmacéutico", "médico", "enfermera", "partera", "dentista", "veterinario",
            "maestro", "profesor", "estudiante", "ingeniero", "arquitecto", "abogado", "juez",
            "policía", "guardia", "bombero", "periodista", "fotógrafo", "cineasta",
        ],
    ),
    (
        "Tecnología",
        &[
            "servidor", "router", "switch", "firewall", "backend", "frontend", "API",
            "endpoint", "framework", "compilador", "lenguaje", "biblioteca", "paquete",
            "módulo", "caché", "contenedor", "docker", "virtualización", "hipervisor", "nube",
            "balanceador", "proxy", "microservicio", "monolito", "pipeline", "CI", "CD",
            "test unitario", "depurador", "registro",
        ],
    ),
    (
        "Deportes",
        &[
            "fútbol", "baloncesto", "béisbol", "voleibol", "natación", "atletismo", "tenis",
            "boxeo", "ciclismo", "surf", "karate", "judo", "taekwondo", "esgrima",
            "halterofilia",
        ],
    ),
    (
        "Instrumentos musicales",
        &[
            "guitarra", "batería", "bajo", "piano", "teclado", "violín", "saxofón", "trompeta",
            "flauta", "clarinete", "oboe", "arpa", "ukelele",
        ],
    ),
    (
        "Transporte",
        &[
            "carro", "moto", "bicicleta", "autobús", "camión", "tren", "barco", "avión",
            "helicóptero", "submarino", "patineta", "scooter", "tractor",
        ],
    ),
    (
        "Colores",
        &[
            "rojo", "azul", "verde", "amarillo", "morado", "negro", "blanco", "gris", "naranja",
            "cian", "magenta",
        ],
    ),
    (
        "Emociones",
        &[
            "alegría", "tristeza", "enojo", "miedo", "sorpresa", "confianza", "amor",
            "vergüenza", "orgullo", "ansiedad",
        ],
    ),
    (
        "Lugares interiores",
        &[
            "cocina", "baño", "sala", "dormitorio", "garaje", "ático", "sótano", "oficina",
            "biblioteca", "comedor",
        ],
    ),
    (
        "Herramientas digitales",
        &[
            "editor de texto", "navegador", "IDE", "terminal", "sistema operativo",
            "repositorio", "git", "branch", "commit", "pull request",
        ],
    ),
];
