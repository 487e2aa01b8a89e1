//! Types de données pour le crate igc

use chrono::NaiveDate;
use geo::Point;

/// Un point GPS du tracklog (enregistrement B valide)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Position WGS-84 (x = longitude, y = latitude)
    pub position: Point<f64>,

    /// Altitude en mètres (GPS, ou pression si le GPS est inexploitable)
    pub altitude: i32,
}

impl Fix {
    pub fn new(latitude: f64, longitude: f64, altitude: i32) -> Self {
        Self {
            position: Point::new(longitude, latitude),
            altitude,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.position.y()
    }

    pub fn longitude(&self) -> f64 {
        self.position.x()
    }
}

/// Résultat du parsing d'un fichier IGC
#[derive(Debug, Clone, Default)]
pub struct Track {
    /// Nom du pilote (enregistrement H...PLT)
    pub pilot: Option<String>,

    /// Date du vol (HFDTE / HPDTE)
    pub date: Option<NaiveDate>,

    /// Points dans l'ordre du fichier
    pub fixes: Vec<Fix>,
}

impl Track {
    /// Premier point (décollage)
    pub fn takeoff(&self) -> Option<&Fix> {
        self.fixes.first()
    }

    /// Dernier point, seulement si distinct du décollage
    pub fn landing(&self) -> Option<&Fix> {
        if self.fixes.len() > 1 {
            self.fixes.last()
        } else {
            None
        }
    }
}
